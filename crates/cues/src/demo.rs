//! Built-in script: an EV charger support call.
//!
//! Chunk timestamps were hand-aligned against the reference recording.

use crate::model::{Chunk, Cue, Speaker, StatusTrigger, StepDefinition, StepTrigger};
use crate::script::CueScript;

/// Raw length of the reference recording.
pub const CHARGER_CALL_DURATION: f64 = 137.0;

fn cue(id: &str, speaker: Speaker, start: f64, end: f64, chunks: &[(f64, &str)]) -> Cue {
    Cue {
        id: id.to_string(),
        speaker,
        start_time: start,
        end_time: end,
        chunks: chunks.iter().map(|&(t, text)| Chunk::new(t, text)).collect(),
    }
}

fn step(id: &str, label: &str, detail: &str, is_value_moment: bool) -> StepDefinition {
    StepDefinition {
        id: id.to_string(),
        label: label.to_string(),
        detail: detail.to_string(),
        is_value_moment,
    }
}

fn step_trigger(step_id: &str, activate_at: f64, complete_at: f64) -> StepTrigger {
    StepTrigger {
        step_id: step_id.to_string(),
        activate_at,
        complete_at,
    }
}

pub fn charger_support_call() -> CueScript {
    use Speaker::{Agent, Driver};

    let cues = vec![
        cue("1", Agent, 6.3, 12.0, &[
            (6.3, "Hello, my name is Amelia,"),
            (8.0, "and I'm with Enera Support."),
            (10.2, "How can I help you today?"),
        ]),
        cue("2", Driver, 13.0, 27.0, &[
            (13.0, "Hi, I'm trying to use the charger"),
            (15.2, "at the Church Street car park"),
            (17.0, "in Market Harborough,"),
            (18.6, "but I'm not having much luck."),
            (20.6, "I've tried tapping my contactless card"),
            (22.6, "a few times now,"),
            (23.8, "and it looks like the screen"),
            (25.4, "isn't changing at all."),
        ]),
        cue("3", Agent, 27.5, 36.5, &[
            (27.5, "I'm sorry you're having trouble."),
            (29.4, "Let me look into that for you."),
            (31.3, "You're in Market Harborough."),
            (33.0, "Can you just confirm"),
            (34.2, "the charger ID is MH-102-B?"),
        ]),
        cue("4", Driver, 37.0, 40.5, &[
            (37.0, "Yeah, that's"),
            (38.0, "the one. MH-102-B."),
        ]),
        cue("5", Agent, 41.5, 61.0, &[
            (41.5, "Perfect, thanks."),
            (42.8, "Let me just look into what's happening there."),
            (45.4, "I've just run a diagnostic,"),
            (47.2, "and it looks like the card reader module is frozen,"),
            (50.6, "although the charger itself is healthy."),
            (53.0, "I'm going to trigger a remote reset"),
            (55.0, "on the reader for you now."),
            (56.8, "It should take about 45 seconds"),
            (58.6, "to reboot and come back online."),
        ]),
        cue("6", Driver, 61.5, 64.5, &[
            (61.5, "Great, okay,"),
            (62.8, "I'll hang on."),
        ]),
        cue("7", Agent, 65.5, 81.0, &[
            (65.5, "While we're waiting for that to cycle,"),
            (67.6, "I noticed you're using a guest payment."),
            (69.8, "Did you know that if you used our app,"),
            (72.2, "you'd actually get a 35% discount"),
            (74.2, "for charging during this off-peak window?"),
            (76.6, "It's a fair bit cheaper"),
            (78.4, "than the standard contactless rate."),
        ]),
        cue("8", Driver, 81.5, 89.0, &[
            (81.5, "Oh, interesting."),
            (82.9, "I wasn't aware of that."),
            (84.6, "I will give the app a go"),
            (87.0, "next time. Thanks."),
        ]),
        cue("9", Agent, 89.5, 101.5, &[
            (89.5, "It's definitely worth it for the savings."),
            (91.8, "Okay, the card reader has finished rebooting"),
            (94.2, "and is showing as available again."),
            (96.0, "Could you give your card another tap for me?"),
            (98.6, "It should authorize straight away now."),
        ]),
        cue("10", Driver, 102.0, 113.0, &[
            (102.0, "Yeah, let me try that."),
            (104.0, "Okay, oh yeah, it's worked."),
            (106.2, "It says preparing,"),
            (107.6, "and it sounds like the cable's locked,"),
            (109.8, "so I think we're good."),
            (111.6, "Thank you."),
        ]),
        cue("11", Agent, 113.5, 122.0, &[
            (113.5, "You're very welcome."),
            (114.9, "I can see the session has successfully initialized"),
            (117.4, "on my end, too."),
            (118.8, "Is there anything else"),
            (120.0, "I can help you with today?"),
        ]),
        cue("12", Driver, 122.5, 126.0, &[
            (122.5, "No, that's it."),
            (124.0, "Thanks for everything."),
        ]),
        cue("13", Agent, 127.5, 134.0, &[
            (127.5, "No problem at all."),
            (129.2, "Have a lovely day,"),
            (130.8, "and enjoy the rest of your drive."),
        ]),
    ];

    let status_triggers = vec![
        StatusTrigger::new(12.0, "Listening to driver"),
        StatusTrigger::new(27.0, "Understanding the issue"),
        StatusTrigger::new(30.5, "Locating charger station"),
        StatusTrigger::new(40.0, "Charger MH-102-B identified"),
        StatusTrigger::new(47.0, "Running remote diagnostics"),
        StatusTrigger::new(49.5, "Card reader unresponsive"),
        StatusTrigger::new(56.5, "Resetting payment module"),
        StatusTrigger::new(74.5, "Discount offer presented"),
        StatusTrigger::new(96.5, "Charger available again"),
        StatusTrigger::new(105.5, "Charging session confirmed"),
        StatusTrigger::new(128.5, "Issue resolved"),
    ];

    let steps = vec![
        step("1", "Call connected", "", false),
        step("2", "Issue reported", "", false),
        step("3", "Location confirmed", "", false),
        step("4", "Charger ID verified", "MH-102-B", false),
        step("5", "Diagnostics run", "Reader frozen", false),
        step("6", "Reset triggered", "", false),
        step("7", "Upsell offered", "35% discount", true),
        step("8", "Charger available", "", false),
        step("9", "Session started", "", false),
    ];

    let step_triggers = vec![
        step_trigger("1", 6.3, 13.0),
        step_trigger("2", 13.0, 27.5),
        step_trigger("3", 27.5, 37.0),
        step_trigger("4", 37.0, 41.5),
        step_trigger("5", 46.0, 53.5),
        step_trigger("6", 55.5, 65.5),
        step_trigger("7", 73.0, 81.5),
        step_trigger("8", 95.5, 102.0),
        step_trigger("9", 107.0, 136.5),
    ];

    CueScript {
        title: Some("EV charger support call".to_string()),
        cues,
        status_triggers,
        steps,
        step_triggers,
        duration: Some(CHARGER_CALL_DURATION),
        complete_at: None,
    }
}

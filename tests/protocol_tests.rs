use signup_coordinator::db::models::{Controller, CountryChoice, SignedSlot, SlotOption};
use signup_coordinator::protocol::{Controls, Inbound};

#[test]
fn inbound_events_parse_from_tagged_json() {
    let press: Inbound = serde_json::from_str(
        r#"{"type":"SignupPressed","game_id":1,"player_id":42,"tag":"anna#0001"}"#,
    )
    .unwrap();
    assert!(matches!(
        press,
        Inbound::SignupPressed {
            game_id: 1,
            player_id: 42,
            ..
        }
    ));

    let decision: Inbound = serde_json::from_str(
        r#"{"type":"ApprovalDecision","request_id":7,"approver_id":42,"approve":false}"#,
    )
    .unwrap();
    assert!(matches!(
        decision,
        Inbound::ApprovalDecision {
            request_id: 7,
            approve: false,
            ..
        }
    ));
}

#[test]
fn country_menu_carries_label_value_and_emoji() {
    let menu = Controls::country_menu(&[CountryChoice {
        country_id: 5,
        name: "Luxembourg".into(),
        emoji: "🇱🇺".into(),
    }]);

    assert!(menu.offers(5));
    assert!(!menu.offers(6));
    assert_eq!(menu.chosen_placeholder(5).unwrap(), "🇱🇺  Luxembourg");
}

#[test]
fn unsign_menu_entries_have_no_emoji_latch_prefix() {
    let menu = Controls::unsign_menu(&[SignedSlot {
        record_id: 3,
        country_name: "Germany".into(),
        controller: Controller::Secondary,
        option: SlotOption::First,
    }]);

    assert_eq!(
        menu.chosen_placeholder(3).unwrap(),
        "Germany (Secondary Controller (CO-OP)) - First Option"
    );
}

#[test]
fn confirm_deny_controls_never_latch_by_value() {
    let buttons = Controls::ConfirmDeny { request_id: 9 };
    assert!(!buttons.offers(1));
    assert!(buttons.chosen_placeholder(1).is_none());
}

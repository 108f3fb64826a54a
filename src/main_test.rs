use super::*;

// =========================================================================
// SessionCommand::parse
// =========================================================================

#[test]
fn parses_commands_and_arguments() {
    assert_eq!(SessionCommand::parse("prompt draw a login flow"), SessionCommand::Prompt("draw a login flow"));
    assert_eq!(SessionCommand::parse("  edit  flow.puml "), SessionCommand::Edit("flow.puml"));
    assert_eq!(SessionCommand::parse("submit"), SessionCommand::Submit);
    assert_eq!(SessionCommand::parse("show"), SessionCommand::Show);
    assert_eq!(SessionCommand::parse("export"), SessionCommand::Export);
    assert_eq!(SessionCommand::parse("reset"), SessionCommand::Reset);
    assert_eq!(SessionCommand::parse("exit"), SessionCommand::Quit);
}

#[test]
fn blank_and_unknown_lines() {
    assert_eq!(SessionCommand::parse("   "), SessionCommand::Blank);
    assert_eq!(SessionCommand::parse("frobnicate"), SessionCommand::Help);
    assert_eq!(SessionCommand::parse("prompt"), SessionCommand::Prompt(""));
}

// =========================================================================
// SessionCommand::reports_error
// =========================================================================

#[test]
fn only_submit_and_export_report_errors() {
    assert!(SessionCommand::Submit.reports_error());
    assert!(SessionCommand::Export.reports_error());
    for quiet in [
        SessionCommand::Blank,
        SessionCommand::Prompt("x"),
        SessionCommand::Edit("f"),
        SessionCommand::Show,
        SessionCommand::Reset,
        SessionCommand::Quit,
        SessionCommand::Help,
    ] {
        assert!(!quiet.reports_error(), "{quiet:?}");
    }
}

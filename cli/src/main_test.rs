use super::*;
use chirp::net::error::Failure;

// =============================================================================
// CliError::from_api
// =============================================================================

#[test]
fn auth_denied_is_a_silent_redirect() {
    let err = CliError::from_api(ApiError::AuthDenied { message: None }, "Failed to load tweets. Please try again later.", false);
    assert!(matches!(err, CliError::Redirected));
}

#[test]
fn other_failures_become_notices() {
    let err = CliError::from_api(
        ApiError::Failed(Failure::status(500, None)),
        "Failed to load notifications. Please try again later.",
        false,
    );
    assert_eq!(err.to_string(), "Failed to load notifications. Please try again later.");
}

// =============================================================================
// Command routes
// =============================================================================

#[test]
fn commands_name_their_view() {
    let cli = Cli::parse_from(["chirp", "tweet", "like", "t1"]);
    assert_eq!(cli.command.route(), Route::Tweet { id: "t1".to_owned() });

    let cli = Cli::parse_from(["chirp", "--api-url", "http://localhost:5000", "login"]);
    assert_eq!(cli.command.route(), Route::Login);
    assert_eq!(cli.api_url.as_deref(), Some("http://localhost:5000"));

    let cli = Cli::parse_from(["chirp", "profile", "edit", "--bio", "hi"]);
    assert_eq!(cli.command.route(), Route::EditProfile);
}

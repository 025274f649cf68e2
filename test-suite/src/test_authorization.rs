use crate::{RawClient, TestEnvironment};

#[test]
fn test_simple_login() {
    let env = TestEnvironment::new();
    let mut client = RawClient::connect(env.server_addr);
    client.login();
    assert_eq!(client.cmd("QUIT"), "221 Goodbye.");
}

#[test]
fn test_commands_gated_until_login() {
    let env = TestEnvironment::new();
    let mut client = RawClient::connect(env.server_addr);
    for command in [
        "PWD", "SYST", "PASV", "EPSV", "PORT 127,0,0,1,4,210", "LIST", "RETR f", "STOR f",
        "TYPE I", "STAT", "XYZZY",
    ] {
        let reply = client.cmd(command);
        assert_eq!(reply, "530 Log in with USER and PASS.", "for {}", command);
    }
}

#[test]
fn test_help_noop_and_feat_available_before_login() {
    let env = TestEnvironment::new();
    let mut client = RawClient::connect(env.server_addr);
    assert_eq!(client.cmd("NOOP"), "200 OK.");
    let help = client.cmd_multi("HELP");
    assert!(help[0].starts_with("214-"));
    let feat = client.cmd_multi("FEAT");
    assert_eq!(feat[0], "211-Extensions supported:");
    assert_eq!(feat.last().unwrap(), "211 End.");
}

#[test]
fn test_wrong_password_clears_username() {
    let env = TestEnvironment::new();
    let mut client = RawClient::connect(env.server_addr);
    assert_eq!(client.cmd("USER test"), "331 Please specify the password.");
    assert_eq!(
        client.cmd("PASS wrong"),
        "430 Invalid user name or password."
    );
    // The pending username is gone, so PASS must be preceded by USER again.
    assert_eq!(client.cmd("PASS test"), "503 Log in with USER first.");
    client.login();
}

#[test]
fn test_unknown_user_is_rejected() {
    let env = TestEnvironment::new();
    let mut client = RawClient::connect(env.server_addr);
    assert_eq!(
        client.cmd("USER nobody"),
        "331 Please specify the password."
    );
    assert_eq!(
        client.cmd("PASS whatever"),
        "430 Invalid user name or password."
    );
}

#[test]
fn test_pass_before_user() {
    let env = TestEnvironment::new();
    let mut client = RawClient::connect(env.server_addr);
    assert_eq!(client.cmd("PASS test"), "503 Log in with USER first.");
}

#[test]
fn test_empty_username() {
    let env = TestEnvironment::new();
    let mut client = RawClient::connect(env.server_addr);
    assert_eq!(client.cmd("USER"), "504 A user name is required.");
}

#[test]
fn test_no_user_change_after_login() {
    let env = TestEnvironment::new();
    let mut client = RawClient::connect(env.server_addr);
    client.login();
    assert_eq!(client.cmd("USER other"), "530 Cannot change user.");
    assert_eq!(client.cmd("PASS anything"), "230 Already logged in.");
}

#[test]
fn test_server_without_authorizer_accepts_anyone() {
    let env = TestEnvironment::open();
    let mut client = RawClient::connect(env.server_addr);
    assert_eq!(
        client.cmd("USER anonymous"),
        "331 Please specify the password."
    );
    assert_eq!(client.cmd("PASS guest"), "230 Login successful.");
    assert_eq!(client.cmd("PWD"), "257 \"/\" is the current directory.");
}

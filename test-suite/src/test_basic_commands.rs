use crate::{RawClient, TestEnvironment};

#[test]
fn test_connect_and_quit() {
    let env = TestEnvironment::new();
    let mut client = RawClient::connect(env.server_addr);
    assert_eq!(client.cmd("QUIT"), "221 Goodbye.");
}

#[test]
fn test_working_directory_starts_at_root() {
    let env = TestEnvironment::new();
    let mut client = RawClient::connect(env.server_addr);
    client.login();
    assert_eq!(client.cmd("PWD"), "257 \"/\" is the current directory.");
}

#[test]
fn test_make_and_change_directories() {
    let env = TestEnvironment::new();
    let mut client = RawClient::connect(env.server_addr);
    client.login();
    assert_eq!(client.cmd("MKD /a"), "257 \"/a\" created.");
    assert!(env.exists("a"));
    assert_eq!(client.cmd("MKD /missing/deep"), "550 No such directory.");
    assert_eq!(client.cmd("CWD /a"), "250 Directory successfully changed.");
    assert_eq!(client.cmd("PWD"), "257 \"/a\" is the current directory.");
    assert_eq!(client.cmd("CDUP"), "250 Directory successfully changed.");
    assert_eq!(client.cmd("PWD"), "257 \"/\" is the current directory.");
}

#[test]
fn test_change_directory_failures() {
    let env = TestEnvironment::new();
    env.create_file("plain.txt", b"not a directory");
    let mut client = RawClient::connect(env.server_addr);
    client.login();
    assert_eq!(client.cmd("CWD /missing"), "550 No such directory.");
    assert_eq!(client.cmd("CWD /plain.txt"), "550 Failed to change directory.");
    assert_eq!(client.cmd("CWD"), "550 Failed to change directory.");
    assert_eq!(client.cmd("PWD"), "257 \"/\" is the current directory.");
}

#[test]
fn test_size() {
    let env = TestEnvironment::new();
    env.create_file("f.txt", b"hello");
    env.create_dir("sub");
    let mut client = RawClient::connect(env.server_addr);
    client.login();
    assert_eq!(client.cmd("SIZE /f.txt"), "213 5");
    assert_eq!(client.cmd("SIZE /sub"), "550 Path specifies a directory.");
    assert_eq!(client.cmd("SIZE /missing"), "550 No such file.");
}

#[test]
fn test_modification_time_format() {
    let env = TestEnvironment::new();
    env.create_file("f.txt", b"hello");
    env.create_dir("sub");
    let mut client = RawClient::connect(env.server_addr);
    client.login();
    let reply = client.cmd("MDTM /f.txt");
    let (code, mdtm) = reply.split_once(' ').unwrap();
    assert_eq!(code, "213");
    assert_eq!(mdtm.len(), 14);
    assert!(mdtm.chars().all(|c| c.is_ascii_digit()));
    assert_eq!(client.cmd("MDTM /sub"), "550 Could not get size.");
    assert_eq!(client.cmd("MDTM /missing"), "550 No such file or directory.");
}

#[test]
fn test_delete() {
    let env = TestEnvironment::new();
    env.create_file("f.txt", b"bye");
    let mut client = RawClient::connect(env.server_addr);
    client.login();
    assert_eq!(client.cmd("DELE /f.txt"), "250 Successfully deleted file.");
    assert!(!env.exists("f.txt"));
    assert_eq!(client.cmd("DELE /f.txt"), "550 No such file.");
    assert_eq!(client.cmd("DELE"), "501 A file name is required.");
}

#[test]
fn test_remove_directory() {
    let env = TestEnvironment::new();
    env.create_dir("sub");
    let mut client = RawClient::connect(env.server_addr);
    client.login();
    assert_eq!(client.cmd("RMD /sub"), "250 Successfully deleted file.");
    assert!(!env.exists("sub"));
}

#[test]
fn test_rename() {
    let env = TestEnvironment::new();
    env.create_file("old.txt", b"contents");
    let mut client = RawClient::connect(env.server_addr);
    client.login();
    assert_eq!(
        client.cmd("RNFR /old.txt"),
        "350 Call RNTO to specify destination."
    );
    assert_eq!(client.cmd("RNTO /new.txt"), "250 Successfully renamed file.");
    assert!(!env.exists("old.txt"));
    assert_eq!(env.read_file("new.txt"), b"contents");
}

#[test]
fn test_rename_source_cleared_by_intervening_command() {
    let env = TestEnvironment::new();
    env.create_file("old.txt", b"contents");
    let mut client = RawClient::connect(env.server_addr);
    client.login();
    assert_eq!(
        client.cmd("RNFR /old.txt"),
        "350 Call RNTO to specify destination."
    );
    assert_eq!(client.cmd("NOOP"), "200 OK.");
    assert_eq!(client.cmd("RNTO /new.txt"), "503 Call RNFR first.");
    assert!(env.exists("old.txt"));
}

#[test]
fn test_rename_argument_checks() {
    let env = TestEnvironment::new();
    let mut client = RawClient::connect(env.server_addr);
    client.login();
    assert_eq!(client.cmd("RNTO /new.txt"), "503 Call RNFR first.");
    assert_eq!(client.cmd("RNFR"), "501 A file name is required.");
}

#[test]
fn test_noop_is_idempotent() {
    let env = TestEnvironment::new();
    let mut client = RawClient::connect(env.server_addr);
    client.login();
    for _ in 0..3 {
        assert_eq!(client.cmd("NOOP"), "200 OK.");
    }
    assert_eq!(client.cmd("PWD"), "257 \"/\" is the current directory.");
}

#[test]
fn test_type_and_mode() {
    let env = TestEnvironment::new();
    let mut client = RawClient::connect(env.server_addr);
    client.login();
    assert_eq!(client.cmd("TYPE I"), "200 Type switched successfully.");
    assert_eq!(client.cmd("TYPE A"), "200 Type switched successfully.");
    assert_eq!(client.cmd("TYPE A N"), "200 Type switched successfully.");
    assert!(client.cmd("TYPE X").starts_with("504"));
    assert!(client.cmd("TYPE E").starts_with("504"));
    assert_eq!(client.cmd("MODE S"), "200 Mode switched successfully.");
    assert_eq!(client.cmd("MODE B"), "504 only stream mode is supported");
    assert!(client.cmd("MODE Z").starts_with("504"));
}

#[test]
fn test_system_type() {
    let env = TestEnvironment::new();
    let mut client = RawClient::connect(env.server_addr);
    client.login();
    assert_eq!(client.cmd("SYST"), "215 UNIX Type: L8");
}

#[test]
fn test_features_are_sorted_and_framed() {
    let env = TestEnvironment::new();
    let mut client = RawClient::connect(env.server_addr);
    client.login();
    let feat = client.cmd_multi("FEAT");
    assert_eq!(feat[0], "211-Extensions supported:");
    assert_eq!(feat.last().unwrap(), "211 End.");
    let keywords: Vec<&str> = feat[1..feat.len() - 1]
        .iter()
        .map(|line| line.trim_start())
        .collect();
    let mut sorted = keywords.clone();
    sorted.sort_unstable();
    assert_eq!(keywords, sorted);
    assert!(keywords.contains(&"REST STREAM"));
    assert!(keywords.contains(&"UTF8"));
    // No security layer configured, so no PBSZ/PROT.
    assert!(!keywords.contains(&"PBSZ"));
    assert!(!keywords.contains(&"PROT"));
}

#[test]
fn test_status_without_argument() {
    let env = TestEnvironment::new();
    let mut client = RawClient::connect(env.server_addr);
    client.login();
    assert_eq!(client.cmd("STAT"), "211 Looks good to me.");
}

#[test]
fn test_status_of_file_and_directory() {
    let env = TestEnvironment::new();
    env.create_file("f.txt", b"hello");
    env.create_file("g.txt", b"there");
    let mut client = RawClient::connect(env.server_addr);
    client.login();
    let status = client.cmd_multi("STAT /f.txt");
    assert_eq!(status[0], "213-Status:");
    assert_eq!(status.last().unwrap(), "213 End.");
    assert!(status[1].ends_with("f.txt"));
    let status = client.cmd_multi("STAT /");
    assert_eq!(status.len(), 4);
    assert!(status[1].ends_with("f.txt"));
    assert!(status[2].ends_with("g.txt"));
    assert_eq!(client.cmd("STAT /missing"), "550 No such file or directory.");
}

#[test]
fn test_opts() {
    let env = TestEnvironment::new();
    let mut client = RawClient::connect(env.server_addr);
    client.login();
    assert_eq!(client.cmd("OPTS UTF8 ON"), "200 Always in UTF8 mode.");
    assert_eq!(client.cmd("OPTS utf8 on"), "200 Always in UTF8 mode.");
    assert_eq!(client.cmd("OPTS MLST size"), "501 Option not understood.");
}

#[test]
fn test_security_commands_require_configuration() {
    let env = TestEnvironment::new();
    let mut client = RawClient::connect(env.server_addr);
    client.login();
    assert_eq!(client.cmd("PBSZ 0"), "502 Not implemented.");
    assert_eq!(client.cmd("PROT P"), "502 Not implemented.");
}

#[test]
fn test_unknown_command_after_login() {
    let env = TestEnvironment::new();
    let mut client = RawClient::connect(env.server_addr);
    client.login();
    assert_eq!(client.cmd("XYZZY"), "502 Not implemented.");
}

#[test]
fn test_restart_argument_validation() {
    let env = TestEnvironment::new();
    let mut client = RawClient::connect(env.server_addr);
    client.login();
    assert_eq!(client.cmd("REST 512"), "350 Restart position accepted (512).");
    assert_eq!(client.cmd("REST abc"), "501 Invalid syntax.");
    assert_eq!(client.cmd("REST -5"), "501 Invalid syntax.");
}

use std::fs;

use assert_cmd::cargo::cargo_bin_cmd;
use predicates::prelude::*;
use tempfile::tempdir;

#[test]
fn test_route_detects_handoff() {
    let home = tempdir().unwrap();

    cargo_bin_cmd!("beth")
        .env("BETH_HOME", home.path())
        .args(["route", "Send $100 to Sarah"])
        .assert()
        .success()
        .stdout(predicate::str::contains("target: nova"))
        .stdout(predicate::str::contains("handoff: yes"))
        .stdout(predicate::str::contains("reason: Detected \"send\" in message"))
        .stdout(predicate::str::contains("announcement: I'll connect you with Nova"));
}

#[test]
fn test_route_sticky_specialist() {
    let home = tempdir().unwrap();

    cargo_bin_cmd!("beth")
        .env("BETH_HOME", home.path())
        .args(["route", "thanks!", "--current", "penny"])
        .assert()
        .success()
        .stdout(predicate::str::contains("target: penny"))
        .stdout(predicate::str::contains("handoff: no"))
        .stdout(predicate::str::contains("Continuing conversation with current agent"));
}

#[test]
fn test_route_honours_configured_priority() {
    let home = tempdir().unwrap();
    fs::write(
        home.path().join("config.toml"),
        "[router]\npriority = [\"penny\"]\n",
    )
    .unwrap();

    cargo_bin_cmd!("beth")
        .env("BETH_HOME", home.path())
        .args(["route", "help me budget so I can pay rent"])
        .assert()
        .success()
        .stdout(predicate::str::contains("target: penny"));
}

fn instant_home() -> tempfile::TempDir {
    let home = tempdir().unwrap();
    fs::write(
        home.path().join("config.toml"),
        "[chat]\nthinking_delay_ms = 0\nannounce_delay_ms = 0\nhandoff_delay_ms = 0\n",
    )
    .unwrap();
    home
}

#[test]
fn test_chat_handoff_transcript() {
    let home = instant_home();
    let root = tempdir().unwrap();

    cargo_bin_cmd!("beth")
        .env("BETH_HOME", home.path())
        .args(["chat", "--root"])
        .arg(root.path())
        .write_stdin("Send $100 to Sarah\n/quit\n")
        .assert()
        .success()
        .stdout(predicate::str::contains("Atlas: Hello! I'm Atlas"))
        .stdout(predicate::str::contains("Atlas → Nova: I'll connect you with Nova"))
        .stdout(predicate::str::contains("Nova: I've prepared a transfer"))
        .stdout(predicate::str::contains("[transfer-confirm]"));
}

#[test]
fn test_chat_alert_and_reset() {
    let home = instant_home();
    let root = tempdir().unwrap();

    cargo_bin_cmd!("beth")
        .env("BETH_HOME", home.path())
        .args(["chat", "--root"])
        .arg(root.path())
        .write_stdin("/alert\n/reset\n")
        .assert()
        .success()
        .stdout(predicate::str::contains("Atlas → Sentinel: ⚠️ Urgent"))
        .stdout(predicate::str::contains("Sentinel: 🚨 ALERT"))
        .stdout(predicate::str::contains("[fraud-alert]"))
        .stdout(predicate::str::contains("Hello! I'm Atlas").count(2));
}

#[test]
fn test_chat_uses_agent_catalog() {
    let home = instant_home();
    let agents = tempdir().unwrap();
    fs::write(
        agents.path().join("atlas.agent.md"),
        "---\nname: Atlas\n---\n",
    )
    .unwrap();
    fs::write(
        agents.path().join("penny.agent.md"),
        "---\nname: Penny\n---\n",
    )
    .unwrap();

    // nova is not in the catalog, so transfers stay with Atlas
    cargo_bin_cmd!("beth")
        .env("BETH_HOME", home.path())
        .args(["chat", "--agents-dir"])
        .arg(agents.path())
        .write_stdin("send money\nmy budget\n")
        .assert()
        .success()
        .stdout(predicate::str::contains("Atlas: I understand your request"))
        .stdout(predicate::str::contains("Atlas → Penny"));
}

#[test]
fn test_chat_catalog_without_default_agent_uses_builtin_team() {
    let home = instant_home();
    let root = tempdir().unwrap();
    let agents = root.path().join(".github").join("agents");
    fs::create_dir_all(&agents).unwrap();
    fs::write(agents.join("beth.agent.md"), "---\nname: Beth\n---\n").unwrap();
    fs::write(
        agents.join("developer.agent.md"),
        "---\nname: Developer\n---\n",
    )
    .unwrap();

    cargo_bin_cmd!("beth")
        .env("BETH_HOME", home.path())
        .args(["chat", "--root"])
        .arg(root.path())
        .write_stdin("hello\n/quit\n")
        .assert()
        .success()
        .stdout(predicate::str::contains("Atlas: Hello! I'm Atlas"))
        .stdout(predicate::str::contains("Atlas: I understand your request"));
}

#[test]
fn test_chat_alert_for_missing_agent_keeps_current_speaker() {
    let home = instant_home();
    let agents = tempdir().unwrap();
    fs::write(
        agents.path().join("atlas.agent.md"),
        "---\nname: Atlas\n---\n",
    )
    .unwrap();
    fs::write(
        agents.path().join("penny.agent.md"),
        "---\nname: Penny\n---\n",
    )
    .unwrap();

    cargo_bin_cmd!("beth")
        .env("BETH_HOME", home.path())
        .args(["chat", "--agents-dir"])
        .arg(agents.path())
        .write_stdin("/alert\nthanks\n/quit\n")
        .assert()
        .success()
        .stdout(predicate::str::contains("! 🚨 ALERT"))
        .stdout(predicate::str::contains("no 'sentinel' agent is available"))
        .stdout(predicate::str::contains("→ sentinel").not())
        .stdout(predicate::str::contains("sentinel:").not())
        .stdout(predicate::str::contains("Atlas: I understand your request"));
}

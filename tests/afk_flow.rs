//! Idle-policy behavior, cycle by cycle.

mod common;

use common::{config_with, voice, Issued, MockLink};
use std::sync::Arc;
use wardend::config::Config;
use wardend::link::ControlLink;
use wardend::plugins::afk::{AfkProbe, AfkSettings};
use wardend::policy::BypassRule;
use wardend::sched::Probe;

const AFK: &str = "\
    afk.idle-time = 600\n\
    afk.channel = 2\n\
    afk.notify = true\n\
    afk.notify-type = chat\n\
    afk.notify-message = moved for idling\n\
    afk.kick = false\n\
    afk.kick-time = 3600\n\
    afk.kick-reason = idle too long\n\
    afk.bypass-groups = -1\n\
    afk.bypass-channel = -1\n";

fn settings(config: &Config) -> AfkSettings {
    AfkSettings::from_config(config).unwrap()
}

fn probe(link: &Arc<MockLink>, config: &Config, id: i64) -> AfkProbe {
    let dyn_link: Arc<dyn ControlLink> = link.clone();
    AfkProbe::new(dyn_link, id, BypassRule::default(), settings(config))
}

#[tokio::test]
async fn first_crossing_notifies_and_moves_exactly_once() {
    let link = MockLink::new();
    let mut client = voice(7, "Slacker");
    client.idle = std::time::Duration::from_secs(650);
    link.put_client(client);

    let config = config_with(AFK);
    let mut probe = probe(&link, &config, 7);

    // 650s idle against a 600s threshold: one chat message, one move.
    probe.tick().await;
    assert_eq!(
        link.issued(),
        vec![
            Issued::Message {
                clid: 7,
                text: "moved for idling".into()
            },
            Issued::Move { clid: 7, cid: 2 },
        ]
    );
    assert!(probe.is_idle());

    // Still 650s idle on the next poll: nothing further happens.
    link.clear_issued();
    link.set_idle(7, 650);
    probe.tick().await;
    assert!(link.issued().is_empty());
    assert!(probe.is_idle());
}

#[tokio::test]
async fn re_engagement_re_arms_the_move() {
    let link = MockLink::new();
    link.put_client(voice(7, "Slacker"));
    let config = config_with(AFK);
    let mut probe = probe(&link, &config, 7);

    link.set_idle(7, 700);
    probe.tick().await;
    assert!(probe.is_idle());

    // Activity: idle drops below the threshold, flag clears, no action.
    link.clear_issued();
    link.set_idle(7, 5);
    probe.tick().await;
    assert!(!probe.is_idle());
    assert!(link.issued().is_empty());

    // A second continuous idle period acts again.
    link.set_idle(7, 700);
    probe.tick().await;
    assert_eq!(link.issued().len(), 2); // notify + move
}

#[tokio::test]
async fn kick_fires_in_the_same_cycle_as_the_move() {
    let link = MockLink::new();
    let mut client = voice(7, "Slacker");
    client.idle = std::time::Duration::from_secs(4000);
    link.put_client(client);

    let config = config_with(&AFK.replace("afk.kick = false", "afk.kick = true"));
    let mut probe = probe(&link, &config, 7);

    probe.tick().await;
    assert_eq!(
        link.issued(),
        vec![
            Issued::Message {
                clid: 7,
                text: "moved for idling".into()
            },
            Issued::Move { clid: 7, cid: 2 },
            Issued::KickServer {
                clid: 7,
                reason: "idle too long".into()
            },
        ]
    );
}

#[tokio::test]
async fn notify_disabled_still_moves() {
    let link = MockLink::new();
    let mut client = voice(7, "Slacker");
    client.idle = std::time::Duration::from_secs(650);
    link.put_client(client);

    let config = config_with(&AFK.replace("afk.notify = true", "afk.notify = false"));
    let mut probe = probe(&link, &config, 7);

    probe.tick().await;
    assert_eq!(link.issued(), vec![Issued::Move { clid: 7, cid: 2 }]);
}

#[tokio::test]
async fn bypassed_client_is_never_acted_on() {
    let link = MockLink::new();
    let mut client = voice(7, "Director");
    client.groups = vec![6];
    client.idle = std::time::Duration::from_secs(9000);
    link.put_client(client);

    let config = config_with(AFK);
    let dyn_link: Arc<dyn ControlLink> = link.clone();
    let mut probe = AfkProbe::new(
        dyn_link,
        7,
        BypassRule::new(vec![6], vec![]),
        settings(&config),
    );

    for _ in 0..5 {
        probe.tick().await;
    }
    assert!(link.issued().is_empty());
    assert!(!probe.is_idle());
}

#[tokio::test]
async fn bypassed_channel_suppresses_the_move() {
    let link = MockLink::new();
    let mut client = voice(7, "Slacker");
    client.channel = 4;
    client.idle = std::time::Duration::from_secs(9000);
    link.put_client(client);

    let config = config_with(AFK);
    let dyn_link: Arc<dyn ControlLink> = link.clone();
    let mut probe = AfkProbe::new(
        dyn_link,
        7,
        BypassRule::new(vec![], vec![4]),
        settings(&config),
    );

    probe.tick().await;
    assert!(link.issued().is_empty());
}

#[tokio::test]
async fn vanished_client_is_a_quiet_cycle() {
    let link = MockLink::new();
    let config = config_with(AFK);
    let mut probe = probe(&link, &config, 99);

    // No client 99 in the mock: the lookup is command-rejected, which the
    // probe treats as "not applicable".
    probe.tick().await;
    assert!(link.issued().is_empty());
}

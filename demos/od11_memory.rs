//! OD-11 session against a simulated speaker on the in-memory transport.
//!
//! The simulated speaker answers joins, pings and client lookups, and pushes a
//! `group_volume_changed` event whenever the volume is set.
//!
//! Run with: RUST_LOG=debug cargo run --example od11_memory

#![allow(
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::panic,
    clippy::panic_in_result_fn
)]

use orthoplay::protocol::{
    ClientInfo, GetClientInfo, GlobalJoined, GroupJoin, GroupJoined, Palette, PaletteColor, Rgb,
    SetVolume, SpeakerPong,
};
use orthoplay::{
    create_memory_transport, AnyAction, InboundEvent, MemoryPeer, Result, Session,
    SessionConfig, TransportConfig,
};
use tracing_subscriber::{fmt as tracing_format, EnvFilter};

#[tokio::main]
async fn main() -> Result<()> {
    // ---
    tracing_format()
        .with_env_filter(EnvFilter::from_default_env())
        .with_target(true)
        .with_line_number(true)
        .init();

    let (transport, speaker) = create_memory_transport(TransportConfig::new("od11"))?;
    let _speaker = tokio::spawn(simulate_speaker(speaker));

    let session = Session::with_transport(transport, SessionConfig::new("living-room")).await?;
    let mut events = session.events().expect("event stream");

    let joined = session.join().await?;
    println!(
        "joined {} on {} (protocol {}.{})",
        joined.mac, joined.ssid, joined.protocol_major_version, joined.protocol_minor_version
    );
    for (index, color) in joined.palette.colors().enumerate() {
        println!("  color {index}: fg {} bg {}", color.foreground, color.background);
    }

    let group: GroupJoined = session.call(&GroupJoin::new(3, "demo", false)).await?;
    println!("group: {:?}", group.group_name);

    let rtt = session.ping().await?;
    println!("ping: {rtt:?}");

    session.send(&SetVolume::new(35)).await?;
    if let Some(InboundEvent::Unsolicited(event)) = events.next().await {
        println!("event: {event:?}");
    }

    let info: ClientInfo = session
        .call(&GetClientInfo {
            uid: "remote-1".into(),
        })
        .await?;
    println!("client {} has color {:?}", info.uid, info.color_index);

    session.close().await
}

async fn simulate_speaker(mut peer: MemoryPeer) -> Result<()> {
    // ---
    loop {
        match peer.next_action().await? {
            AnyAction::GlobalJoin(join) => {
                let palette = Palette::from_colors(
                    "orthocolors",
                    [PaletteColor {
                        foreground: Rgb(0x191919),
                        background: Rgb(0x0e445e),
                    }],
                );
                let version = join.version();
                peer.push_response(GlobalJoined {
                    protocol_major_version: version.major,
                    protocol_minor_version: version.minor,
                    palette,
                    mac: "544a16279d00".into(),
                    ssid: "demo".into(),
                    services: Vec::new(),
                    state: Vec::new(),
                    latest_revision: None,
                    orthocloud_base_url: None,
                })
                .await?;
            }
            AnyAction::GroupJoin(join) => {
                peer.push_response(GroupJoined {
                    group_id: Some("group-1".into()),
                    group_name: Some(join.name),
                    state: Vec::new(),
                })
                .await?;
            }
            AnyAction::SpeakerPing(ping) => {
                peer.push_response(SpeakerPong { value: ping.value }).await?;
            }
            AnyAction::SetVolume(set) => {
                peer.push(format!(
                    r#"{{"response":"group_volume_changed","vol":{}}}"#,
                    set.volume
                ))
                .await?;
            }
            AnyAction::GetClientInfo(get) => {
                peer.push_response(ClientInfo {
                    uid: get.uid,
                    name: None,
                    color_index: Some(3),
                })
                .await?;
            }
            other => println!("speaker ignored `{}`", other.kind()),
        }
    }
}

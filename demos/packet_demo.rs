//! Packet framing demonstration
//!
//! Walks one frame of each family through encode and decode, printing the
//! wire image so the bit layout is visible.
//!
//! Run with:
//! ```sh
//! cargo run --example packet_demo
//! ```

use auraxis::protocol::objects::{ConstructorData, DetailedRekData};
use auraxis::protocol::packets::control::{ControlPacket, TeardownConnection};
use auraxis::protocol::packets::crypto::{CryptoPacket, ServerFinished};
use auraxis::protocol::packets::game::{
    ChatChannel, ChatMsg, GamePacket, KeepAliveMessage, ObjectCreateDetailedMessage,
};
use auraxis::protocol::{decode_packet, encode_packet, Guid, Packet, PacketRegistry};

fn main() {
    println!("=== Auraxis Packet Demo ===\n");

    let registry = PacketRegistry::with_defaults();
    println!("Registry: {} opcodes across three families\n", registry.len());

    println!("--- Game family ---");
    show(
        &registry,
        Packet::game(GamePacket::KeepAlive(KeepAliveMessage { code: 0 })),
    );
    show(
        &registry,
        Packet::game(GamePacket::Chat(ChatMsg {
            channel: ChatChannel::Open,
            wide_contents: true,
            recipient: String::new(),
            contents: "need a gunner".to_string(),
        })),
    );
    show(
        &registry,
        Packet::game(GamePacket::ObjectCreateDetailed(
            ObjectCreateDetailedMessage {
                guid: Guid(1280),
                parent: None,
                data: ConstructorData::Rek(DetailedRekData {
                    unk1: 0xA,
                    unk2: 0x1234,
                }),
            },
        )),
    );

    println!("--- Control family ---");
    show(
        &registry,
        Packet::control(ControlPacket::TeardownConnection(TeardownConnection {
            nonce: 0x1234,
        })),
    );

    println!("--- Crypto family ---");
    show(
        &registry,
        Packet::crypto(CryptoPacket::ServerFinished(ServerFinished {
            challenge_result: [7; 12],
        })),
    );
}

fn show(registry: &PacketRegistry, packet: Packet) {
    let bytes = encode_packet(&packet).expect("Failed to encode");
    println!("Packet:  {packet:?}");
    println!("Encoded ({} bytes): {:02x?}", bytes.len(), &bytes[..]);

    let decoded = decode_packet(registry, &bytes).expect("Failed to decode");
    assert_eq!(decoded, packet);
    println!("✓ Decode matches\n");
}

//! Terminal client for poking at a running server.
//!
//! Type `join <name>`, `start`, `roll`, `buy`, `skip` or `quit`; server
//! events are printed as they arrive.

use bincode::{deserialize, serialize};
use clap::Parser;
use futures_util::{SinkExt, StreamExt};
use log::{info, warn};
use shared::{space, GameSnapshot, LandingEffect, Packet, PlayerId};
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio_tungstenite::connect_async;
use tokio_tungstenite::tungstenite::Message;

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Server address to connect to
    #[arg(short = 's', long, default_value = "127.0.0.1:8080")]
    server: String,

    /// Join immediately under this name
    #[arg(short = 'n', long)]
    name: Option<String>,
}

fn parse_command(line: &str) -> Option<Packet> {
    let mut parts = line.trim().splitn(2, ' ');
    let packet = match parts.next()? {
        "join" => Packet::JoinGame {
            name: parts.next().unwrap_or_default().to_string(),
        },
        "start" => Packet::StartGame,
        "roll" => Packet::RollDice,
        "buy" => Packet::BuyProperty,
        "skip" => Packet::SkipBuy,
        "quit" => Packet::Leave,
        _ => return None,
    };
    Some(packet)
}

fn describe_effect(effect: &LandingEffect) -> String {
    match effect {
        LandingEffect::None => "nothing happens".to_string(),
        LandingEffect::CanBuy { space: id, price } => {
            format!("{} is for sale at ${}", space(*id).name, price)
        }
        LandingEffect::PaidRent { rent, owner_name, .. } => {
            format!("paid ${} rent to {}", rent, owner_name)
        }
        LandingEffect::PaidTax { amount } => format!("paid ${} tax", amount),
        LandingEffect::GoToJail => "went to jail".to_string(),
        LandingEffect::PassedGo { amount } => format!("landed on GO, collected ${}", amount),
    }
}

fn print_state(snapshot: &GameSnapshot, me: Option<PlayerId>) {
    println!("-- phase {:?}, started: {}", snapshot.phase, snapshot.started);
    for player in &snapshot.players {
        let marker = match snapshot.active_player() {
            Some(active) if active.id == player.id => ">",
            _ => " ",
        };
        let you = if Some(player.id) == me { " (you)" } else { "" };
        println!(
            "{} {}{}: ${} on {}{}, owns {:?}",
            marker,
            player.name,
            you,
            player.cash,
            space(player.position).name,
            if player.in_jail { " [jail]" } else { "" },
            player.properties
        );
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::init();
    let args = Args::parse();

    let url = format!("ws://{}", args.server);
    let (websocket, _) = connect_async(url.as_str()).await?;
    info!("Connected to {}", url);
    let (mut sink, mut source) = websocket.split();

    if let Some(name) = args.name {
        sink.send(Message::Binary(serialize(&Packet::JoinGame { name })?))
            .await?;
    }

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let mut me: Option<PlayerId> = None;

    loop {
        tokio::select! {
            line = lines.next_line() => {
                let Some(line) = line? else { break };
                match parse_command(&line) {
                    Some(packet) => {
                        let leaving = packet == Packet::Leave;
                        sink.send(Message::Binary(serialize(&packet)?)).await?;
                        if leaving {
                            break;
                        }
                    }
                    None => println!("commands: join <name>, start, roll, buy, skip, quit"),
                }
            }
            incoming = source.next() => {
                let data = match incoming {
                    Some(Ok(Message::Binary(data))) => data,
                    Some(Ok(Message::Close(_))) | None => {
                        println!("Server closed the connection");
                        break;
                    }
                    Some(Ok(_)) => continue,
                    Some(Err(e)) => return Err(e.into()),
                };
                let packet: Packet = match deserialize(&data) {
                    Ok(packet) => packet,
                    Err(e) => {
                        warn!("Failed to deserialize packet: {}", e);
                        continue;
                    }
                };

                match packet {
                    Packet::Connected { client_id } => {
                        me = Some(client_id);
                        println!("You are client {}", client_id);
                    }
                    Packet::Rejected { reason } => {
                        println!("Rejected: {}", reason);
                        break;
                    }
                    Packet::GameState(snapshot) => print_state(&snapshot, me),
                    Packet::DiceRolled { player_id, dice, total, is_doubles, passed_go, effect, .. } => {
                        println!(
                            "Player {} rolled {}+{}={}{}{}: {}",
                            player_id,
                            dice.0,
                            dice.1,
                            total,
                            if is_doubles { " (doubles)" } else { "" },
                            if passed_go { ", passed GO" } else { "" },
                            describe_effect(&effect)
                        );
                    }
                    Packet::PropertyBought { player_id, space_name, price } => {
                        println!("Player {} bought {} for ${}", player_id, space_name, price);
                    }
                    Packet::Error { message } => println!("Error: {}", message),
                    other => warn!("Unexpected packet type: {:?}", other),
                }
            }
        }
    }

    let _ = sink.close().await;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_commands() {
        assert_eq!(
            parse_command("join Alice Smith"),
            Some(Packet::JoinGame {
                name: "Alice Smith".to_string()
            })
        );
        assert_eq!(parse_command(" roll "), Some(Packet::RollDice));
        assert_eq!(parse_command("quit"), Some(Packet::Leave));
        assert_eq!(parse_command("dance"), None);
        assert_eq!(parse_command(""), None);
    }

    #[test]
    fn test_describe_effect() {
        assert_eq!(
            describe_effect(&LandingEffect::CanBuy { space: 39, price: 400 }),
            "Boardwalk is for sale at $400"
        );
        assert_eq!(describe_effect(&LandingEffect::PaidTax { amount: 100 }), "paid $100 tax");
    }
}

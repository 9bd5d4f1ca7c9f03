use std::io::{IsTerminal, Write};

use clap::ValueEnum;
use comfy_table::{presets::UTF8_FULL, ContentArrangement, Table};
use cpxwire_codec::{Decoded, MachMessage};
use cpxwire_value::port::disposition_name;
use cpxwire_value::{Message, Port};
use serde::Serialize;
use serde_json::{Map, Value as Json};

use crate::json::{dictionary_to_json, to_json};

#[derive(Clone, Debug, Copy, ValueEnum)]
pub enum OutputFormat {
    Json,
    Table,
    Pretty,
    Raw,
}

impl OutputFormat {
    pub fn default_for_stdout() -> Self {
        if std::io::stdout().is_terminal() {
            Self::Table
        } else {
            Self::Json
        }
    }
}

#[derive(Serialize)]
struct PortOutput {
    name: u32,
    disposition: u8,
    disposition_name: &'static str,
}

impl From<Port> for PortOutput {
    fn from(port: Port) -> Self {
        Self {
            name: port.name,
            disposition: port.disposition,
            disposition_name: disposition_name(port.disposition),
        }
    }
}

#[derive(Serialize)]
struct DecodedOutput {
    id: i32,
    connection_interrupted: bool,
    size: usize,
    remote_port: PortOutput,
    local_port: PortOutput,
    ports: Vec<PortOutput>,
    content: Map<String, Json>,
}

#[derive(Serialize)]
struct EncodedOutput {
    id: i32,
    size: usize,
    complex: bool,
    ports: Vec<PortOutput>,
}

pub fn print_decoded(decoded: &Decoded, size: usize, format: OutputFormat) {
    let message = decoded.message();
    let content = dictionary_to_json(&message.content);

    match format {
        OutputFormat::Json => {
            let out = DecodedOutput {
                id: message.id,
                connection_interrupted: decoded.is_connection_interrupted(),
                size,
                remote_port: message.remote_port.into(),
                local_port: message.local_port.into(),
                ports: port_outputs(message),
                content,
            };
            println!(
                "{}",
                serde_json::to_string(&out).unwrap_or_else(|_| "{}".to_string())
            );
        }
        OutputFormat::Table => {
            let mut table = Table::new();
            table
                .load_preset(UTF8_FULL)
                .set_content_arrangement(ContentArrangement::Dynamic)
                .set_header(vec!["KEY", "TYPE", "VALUE"]);
            for (key, value) in message.content.iter() {
                table.add_row(vec![
                    key.to_string(),
                    value.value_type().name().to_string(),
                    to_json(value).to_string(),
                ]);
            }
            println!(
                "id={} size={} remote={} local={}{}",
                message.id,
                size,
                port_label(message.remote_port),
                port_label(message.local_port),
                if decoded.is_connection_interrupted() {
                    " (connection interrupted)"
                } else {
                    ""
                }
            );
            println!("{table}");
        }
        OutputFormat::Pretty => {
            println!(
                "id={} size={} ports={}",
                message.id,
                size,
                message.ports().len()
            );
            println!(
                "{}",
                serde_json::to_string_pretty(&Json::Object(content))
                    .unwrap_or_else(|_| "{}".to_string())
            );
        }
        OutputFormat::Raw => {
            let text = Json::Object(content).to_string();
            print_raw(text.as_bytes());
            print_raw(b"\n");
        }
    }
}

pub fn print_encoded(message: &Message, wire: &MachMessage, format: OutputFormat) {
    match format {
        OutputFormat::Raw => print_raw(wire.as_bytes()),
        OutputFormat::Json => {
            let out = EncodedOutput {
                id: message.id,
                size: wire.len(),
                complex: !message.ports().is_empty(),
                ports: port_outputs(message),
            };
            println!(
                "{}",
                serde_json::to_string(&out).unwrap_or_else(|_| "{}".to_string())
            );
        }
        OutputFormat::Table | OutputFormat::Pretty => {
            println!(
                "encoded id={} size={} ports={}",
                message.id,
                wire.len(),
                message.ports().len()
            );
        }
    }
}

pub fn print_raw(data: &[u8]) {
    let mut out = std::io::stdout();
    let _ = out.write_all(data);
    let _ = out.flush();
}

fn port_outputs(message: &Message) -> Vec<PortOutput> {
    message.ports().into_iter().map(PortOutput::from).collect()
}

fn port_label(port: Port) -> String {
    if port.is_null() {
        "null".to_string()
    } else {
        format!("{:#x}/{}", port.name, disposition_name(port.disposition))
    }
}

//! numtree-admin CLI tool
//!
//! Manages the author directory of a running numtree node.
//!
//! Usage:
//!   numtree-admin put-author <author_id> <name>
//!   numtree-admin get-author <author_id>
//!   numtree-admin stats
//!   numtree-admin ping

use numtree_node::admin_socket::{default_socket_path, AdminCommand, AdminResponse};
use std::io::{BufRead, BufReader, Write};
use std::os::unix::net::UnixStream;
use std::path::PathBuf;

fn print_usage() {
    eprintln!("numtree-admin - Manage a numtree node's author directory");
    eprintln!();
    eprintln!("Usage:");
    eprintln!("  numtree-admin put-author <author_id> <name>  Register or rename an author");
    eprintln!("  numtree-admin get-author <author_id>         Show an author's display name");
    eprintln!("  numtree-admin stats                          Show node, root and author counts");
    eprintln!("  numtree-admin ping                           Check if daemon is running");
    eprintln!();
    eprintln!("Environment:");
    eprintln!("  NUMTREE_SOCKET  Path to admin socket (default: ./numtree-data/admin.sock)");
}

fn get_socket_path() -> PathBuf {
    std::env::var("NUMTREE_SOCKET")
        .map(PathBuf::from)
        .unwrap_or_else(|_| default_socket_path())
}

fn send_command(cmd: AdminCommand) -> Result<AdminResponse, String> {
    let socket_path = get_socket_path();

    let mut stream = UnixStream::connect(&socket_path).map_err(|e| {
        format!(
            "Failed to connect to numtree-node at {:?}: {}\n\
             Is the numtree-node running?",
            socket_path, e
        )
    })?;

    // Send command
    let cmd_json = serde_json::to_string(&cmd).map_err(|e| e.to_string())?;
    writeln!(stream, "{}", cmd_json).map_err(|e| e.to_string())?;

    // Read response
    let mut reader = BufReader::new(&stream);
    let mut response_line = String::new();
    reader
        .read_line(&mut response_line)
        .map_err(|e| e.to_string())?;

    serde_json::from_str(&response_line).map_err(|e| format!("Invalid response: {}", e))
}

fn require(args: &[String], index: usize, what: &str) -> String {
    match args.get(index) {
        Some(value) => value.clone(),
        None => {
            eprintln!("Error: {} requires {}", args[1], what);
            std::process::exit(1);
        }
    }
}

fn main() {
    let args: Vec<String> = std::env::args().collect();

    if args.len() < 2 {
        print_usage();
        std::process::exit(1);
    }

    let cmd = match args[1].as_str() {
        "put-author" => AdminCommand::PutAuthor {
            author_id: require(&args, 2, "an author_id argument"),
            name: require(&args, 3, "a name argument"),
        },
        "get-author" => AdminCommand::GetAuthor {
            author_id: require(&args, 2, "an author_id argument"),
        },
        "stats" => AdminCommand::Stats,
        "ping" => AdminCommand::Ping,
        "-h" | "--help" | "help" => {
            print_usage();
            std::process::exit(0);
        }
        other => {
            eprintln!("Unknown command: {}", other);
            print_usage();
            std::process::exit(1);
        }
    };

    match send_command(cmd) {
        Ok(response) => match response {
            AdminResponse::Ok { message } => {
                println!("{}", message);
            }
            AdminResponse::Error { error } => {
                eprintln!("Error: {}", error);
                std::process::exit(1);
            }
            AdminResponse::Author { author_id, name } => match name {
                Some(name) => println!("{}\t{}", author_id, name),
                None => {
                    println!("{}\t(unregistered)", author_id);
                    std::process::exit(1);
                }
            },
            AdminResponse::Stats {
                nodes,
                roots,
                authors,
            } => {
                println!("nodes:   {}", nodes);
                println!("roots:   {}", roots);
                println!("authors: {}", authors);
            }
            AdminResponse::Pong => {
                println!("pong - numtree-node is running");
            }
        },
        Err(e) => {
            eprintln!("{}", e);
            std::process::exit(1);
        }
    }
}

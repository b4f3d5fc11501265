use crate::input::{InputAction, InputManager, HELP_TEXT};
use log::{debug, info, warn};
use shared::{Command, END_MARKER};
use std::io;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::net::tcp::{OwnedReadHalf, OwnedWriteHalf};
use tokio::net::TcpStream;

/// Reads one server frame: every line up to the `<END>` marker.
///
/// Returns None if the connection closed before any line arrived. A frame
/// cut short by the server closing (such as a "Server full." notice) is
/// returned as-is.
pub async fn read_frame<R>(reader: &mut R) -> io::Result<Option<Vec<String>>>
where
    R: AsyncBufRead + Unpin,
{
    let mut lines = Vec::new();
    let mut line = String::new();

    loop {
        line.clear();
        if reader.read_line(&mut line).await? == 0 {
            return Ok(if lines.is_empty() { None } else { Some(lines) });
        }

        let text = line.trim_end_matches(['\r', '\n']);
        if text == END_MARKER {
            return Ok(Some(lines));
        }
        lines.push(text.to_string());
    }
}

pub struct Client {
    reader: BufReader<OwnedReadHalf>,
    writer: OwnedWriteHalf,
    input: InputManager,
}

impl Client {
    pub async fn connect(server_addr: &str) -> io::Result<Self> {
        let stream = TcpStream::connect(server_addr).await?;
        info!("Connected to {}", stream.peer_addr()?);

        let (reader, writer) = stream.into_split();
        Ok(Client {
            reader: BufReader::new(reader),
            writer,
            input: InputManager::new(),
        })
    }

    pub async fn send_line(&mut self, line: &str) -> io::Result<()> {
        self.writer.write_all(line.as_bytes()).await?;
        self.writer.write_all(b"\n").await?;
        self.writer.flush().await
    }

    pub async fn next_frame(&mut self) -> io::Result<Option<Vec<String>>> {
        read_frame(&mut self.reader).await
    }

    /// Interactive loop: stdin lines go out, frames come back and are printed
    pub async fn run(&mut self) -> io::Result<()> {
        match self.next_frame().await? {
            Some(frame) => print_frame(&frame),
            None => {
                warn!("Server closed the connection before sending the maze");
                return Ok(());
            }
        }
        println!("{}", HELP_TEXT);

        let mut stdin = BufReader::new(tokio::io::stdin()).lines();
        while let Some(line) = stdin.next_line().await? {
            let outgoing = match self.input.interpret(&line) {
                InputAction::Send(outgoing) => outgoing,
                InputAction::Help => {
                    println!("{}", HELP_TEXT);
                    continue;
                }
                InputAction::Quit => break,
                InputAction::Skip => continue,
            };

            debug!("Sending {:?}", outgoing);
            self.send_line(&outgoing).await?;

            if Command::parse(&outgoing) == Command::Shutdown {
                info!("Asked the server to shut down");
                while self.next_frame().await?.is_some() {}
                return Ok(());
            }

            match self.next_frame().await? {
                Some(frame) => print_frame(&frame),
                None => {
                    warn!("Server closed the connection");
                    return Ok(());
                }
            }
        }

        info!("Disconnecting after {} commands", self.input.lines_sent());
        Ok(())
    }
}

fn print_frame(frame: &[String]) {
    for line in frame {
        println!("{}", line);
    }
}

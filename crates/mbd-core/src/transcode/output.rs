//! Merges the child's stdout and stderr into one stream of lines.
//!
//! The tool ends its status lines with `\r` on stderr, so both `\r` and `\n`
//! terminate a line.

use tokio::io::{AsyncRead, AsyncReadExt};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

const CHUNK: usize = 8 * 1024;

/// Spawns a task forwarding every line of `reader` to `tx`. The task ends at
/// EOF, on a read error, or once the receiver is gone.
pub(crate) fn spawn_line_forwarder<R>(mut reader: R, tx: mpsc::Sender<String>) -> JoinHandle<()>
where
    R: AsyncRead + Unpin + Send + 'static,
{
    tokio::spawn(async move {
        let mut chunk = vec![0u8; CHUNK];
        let mut pending: Vec<u8> = Vec::new();
        loop {
            let n = match reader.read(&mut chunk).await {
                Ok(0) => break,
                Ok(n) => n,
                Err(e) => {
                    tracing::debug!("process output read: {}", e);
                    break;
                }
            };
            for &b in &chunk[..n] {
                if b == b'\n' || b == b'\r' {
                    if !flush(&mut pending, &tx).await {
                        return;
                    }
                } else {
                    pending.push(b);
                }
            }
        }
        flush(&mut pending, &tx).await;
    })
}

/// Sends the buffered line if non-blank. Returns false when the receiver is gone.
async fn flush(pending: &mut Vec<u8>, tx: &mpsc::Sender<String>) -> bool {
    if pending.iter().all(u8::is_ascii_whitespace) {
        pending.clear();
        return true;
    }
    let line = String::from_utf8_lossy(pending).into_owned();
    pending.clear();
    tx.send(line).await.is_ok()
}

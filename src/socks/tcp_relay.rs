//! Bidirectional relay once a CONNECT or BIND tunnel is up

use tokio::io::{AsyncRead, AsyncWrite};
use tracing::debug;

/// Relay data bidirectionally between two streams
///
/// Returns the byte counts `(a -> b, b -> a)` once both directions have
/// reached EOF, or the first error.
pub async fn relay_tcp<A, B>(mut a: A, mut b: B) -> std::io::Result<(u64, u64)>
where
    A: AsyncRead + AsyncWrite + Unpin,
    B: AsyncRead + AsyncWrite + Unpin,
{
    let (a_to_b, b_to_a) = tokio::io::copy_bidirectional(&mut a, &mut b).await?;
    debug!("Relay finished: {} bytes A->B, {} bytes B->A", a_to_b, b_to_a);
    Ok((a_to_b, b_to_a))
}

use anyhow::{anyhow, Result};

/// Temperature that makes SGLD sample the tempered posterior used for local
/// learning coefficient estimation: `batch_size / ln(batch_size)`.
pub fn optimal_temperature(batch_size: usize) -> Result<f32> {
    if batch_size < 2 {
        return Err(anyhow!(
            "Batch size must be at least 2 to derive a temperature, got {}",
            batch_size
        ));
    }
    let m = batch_size as f64;
    Ok((m / m.ln()) as f32)
}

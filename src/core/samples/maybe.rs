use crate::config::toml_config::MaybeConfig;
use crate::core::output::SampleOutput;
use crate::utils::error::{AppError, Result};
use rand::Rng;

pub const FIRST_PRIZE: u32 = 1;
pub const SECOND_PRIZE: u32 = 2;
pub const NOTHING_FOUND: &str = "no prize this time, neither the cache nor the network had anything";

fn draw<R: Rng>(rng: &mut R, threshold: u32) -> bool {
    rng.gen_range(1..=10) > threshold
}

/// Stage one: a cache hit is rare.
pub fn from_cache<R: Rng>(rng: &mut R, threshold: u32) -> Option<u32> {
    draw(rng, threshold).then_some(FIRST_PRIZE)
}

/// Stage two: the network answers more often.
pub fn from_network<R: Rng>(rng: &mut R, threshold: u32) -> Option<u32> {
    draw(rng, threshold).then_some(SECOND_PRIZE)
}

pub fn prize_name(id: u32) -> String {
    match id {
        FIRST_PRIZE => "first prize".to_string(),
        SECOND_PRIZE => "second prize".to_string(),
        other => format!("prize #{}", other),
    }
}

/// Cache first, network only when the cache had nothing. Fails with
/// [`AppError::NoValue`] when neither stage produced a value.
pub fn cache_then_network<R: Rng>(rng: &mut R, settings: &MaybeConfig) -> Result<String> {
    from_cache(rng, settings.cache_threshold)
        .or_else(|| from_network(rng, settings.network_threshold))
        .map(prize_name)
        .ok_or(AppError::NoValue)
}

pub async fn run<R: Rng + Send>(output: SampleOutput, mut rng: R, settings: MaybeConfig) {
    match cache_then_network(&mut rng, &settings) {
        Ok(prize) => output.append_line(format!("you won the {}", prize)),
        Err(e) => {
            // 找不到值不是錯誤，換成固定訊息顯示
            tracing::debug!("maybe chain came up empty: {}", e);
            output.append_line(NOTHING_FOUND);
        }
    }
}

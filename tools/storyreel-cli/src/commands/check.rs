//! Check the transcoding engine and speech service.

use storyreel_common::config::AppConfig;
use storyreel_render_engine::EngineLocator;
use storyreel_speech::SpeechService;

pub async fn run(config: &AppConfig) -> anyhow::Result<()> {
    println!("storyreel System Check");
    println!("{}", "=".repeat(50));

    let engine_ok = match EngineLocator::from_env(&config.engine).locate() {
        Ok(located) => {
            println!(
                "[OK] ffmpeg: {} (via {})",
                located.ffmpeg.display(),
                located.strategy.as_str()
            );
            match &located.ffprobe {
                Some(path) => println!("[OK] ffprobe: {}", path.display()),
                None => println!("[WARN] ffprobe: not found, narrated scenes use default durations"),
            }
            true
        }
        Err(e) => {
            println!("[FAIL] {e}");
            false
        }
    };

    let speech = SpeechService::new(&config.speech);
    if speech.is_alive().await {
        println!("[OK] Speech service: {}", config.speech.health_url());
    } else if config.speech.autostart.is_some() {
        println!(
            "[WARN] Speech service: not running at {} (will be started on demand)",
            config.speech.health_url()
        );
    } else {
        println!(
            "[WARN] Speech service: not reachable at {}, narration unavailable",
            config.speech.health_url()
        );
    }

    println!("  Output dir: {}", config.output_dir.display());
    println!("  Work dir:   {}", config.work_dir.display());

    println!();
    if engine_ok {
        println!("Required tools are available. storyreel is ready.");
    } else {
        println!("ffmpeg is missing. Install it or set STORYREEL_FFMPEG.");
    }

    Ok(())
}

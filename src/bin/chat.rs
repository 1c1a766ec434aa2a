//! Terminal chat client for the advisory engine.
//!
//! Reads user messages from stdin, prints assistant replies to stdout,
//! and speaks each reply. Tracing goes to stderr so stdout stays a clean
//! conversation transcript.
//!
//! Commands:
//! - `/image <path>` — attach a JPEG to the next message
//! - `/growth <path>` — analyze a crop photo and log the growth record
//! - `/weather`, `/alerts`, `/schemes`, `/crops` — advisory dashboards
//! - `/live` — start a live voice session; `/stop` ends it
//! - `/quit` — exit

use kisan::cache::ResponseCache;
use kisan::growth::GrowthLog;
use kisan::speech::{LiveVoiceSession, NoLocalVoices, PlaybackWorker, SpeechPipeline};
use kisan::{AdvisoryGateway, Conversation, KisanConfig};
use std::io::{BufRead, Write as _};
use std::sync::Arc;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let config = KisanConfig::load_or_default()?;
    let cache = ResponseCache::open_default();
    let gateway = Arc::new(AdvisoryGateway::new(&config.gateway, cache)?);

    let sink = Arc::new(PlaybackWorker::spawn(&config.audio));
    let speech = SpeechPipeline::new(
        Arc::clone(&gateway),
        sink,
        Arc::new(NoLocalVoices),
        config.audio.output_sample_rate,
    );

    let mut conversation = Conversation::new(config.profile.clone(), Arc::clone(&gateway), speech);
    if let Some(welcome) = conversation.welcome() {
        println!("Kisan-Bhai: {}", welcome.content);
    }

    let profile = config.profile.clone();
    let language = profile.language;
    let mut growth_log = GrowthLog::load_default();
    let mut live: Option<LiveVoiceSession> = None;
    let mut pending_image: Option<String> = None;
    let stdin = std::io::stdin();

    loop {
        print!("> ");
        std::io::stdout().flush()?;

        let mut line = String::new();
        if stdin.lock().read_line(&mut line)? == 0 {
            break;
        }
        let line = line.trim();

        match line {
            "/quit" => break,
            "/live" => {
                if live.is_some() {
                    println!("(live session already running; /stop first)");
                    continue;
                }
                match LiveVoiceSession::start(
                    &config.audio,
                    &config.gateway,
                    gateway.api_key(),
                    language,
                )
                .await
                {
                    Ok(session) => {
                        println!("(live voice started — /stop to end)");
                        live = Some(session);
                    }
                    Err(e) => println!("(could not start live voice: {e})"),
                }
            }
            "/stop" => {
                if let Some(session) = live.take() {
                    session.stop().await;
                    println!("(live voice stopped)");
                } else {
                    println!("(no live session)");
                }
            }
            "/weather" => match gateway.realtime_weather(&profile.location, language).await {
                Ok(report) => {
                    println!(
                        "Now: {}°C, {}% humidity, {} (wind {} km/h, UV {})",
                        report.current.temp,
                        report.current.humidity,
                        report.current.condition,
                        report.current.wind,
                        report.current.uv
                    );
                    for day in &report.forecast {
                        println!("  {}: {}–{}°C, {}", day.day, day.low, day.high, day.condition);
                    }
                }
                Err(e) => println!("(weather unavailable: {e})"),
            },
            "/alerts" => match gateway.proactive_alerts(&profile).await {
                Ok(alerts) => {
                    for alert in alerts {
                        println!("[{}] {} — {}", alert.urgency, alert.title, alert.description);
                    }
                }
                Err(e) => println!("(alerts unavailable: {e})"),
            },
            "/schemes" => match gateway.schemes(language).await {
                Ok(schemes) => {
                    for scheme in schemes {
                        println!("{} ({}): {}", scheme.name, scheme.benefits, scheme.description);
                    }
                }
                Err(e) => println!("(schemes unavailable: {e})"),
            },
            "/crops" => {
                let soil = profile.soil.clone().unwrap_or_else(|| "Loamy".to_owned());
                match gateway
                    .crop_recommendations(&profile.location, "Rabi", &soil, language)
                    .await
                {
                    Ok(crops) => {
                        for crop in crops {
                            println!(
                                "{}: risk {}, profit {}, water {}",
                                crop.name, crop.risk, crop.profit_potential, crop.water_need
                            );
                        }
                    }
                    Err(e) => println!("(recommendations unavailable: {e})"),
                }
            }
            _ if line.starts_with("/image ") => {
                let path = line.trim_start_matches("/image ").trim();
                match std::fs::read(path) {
                    Ok(bytes) => {
                        pending_image = Some(kisan::speech::pcm::encode_base64(&bytes));
                        println!("(image attached; your next message will include it)");
                    }
                    Err(e) => println!("(could not read {path}: {e})"),
                }
            }
            _ if line.starts_with("/growth ") => {
                let path = line.trim_start_matches("/growth ").trim();
                let image = match std::fs::read(path) {
                    Ok(bytes) => kisan::speech::pcm::encode_base64(&bytes),
                    Err(e) => {
                        println!("(could not read {path}: {e})");
                        continue;
                    }
                };
                let crop = profile.crop.clone().unwrap_or_else(|| "Wheat".to_owned());
                match gateway.analyze_growth(&image, &crop, language).await {
                    Ok(analysis) => match growth_log.record(&analysis, &image, &crop) {
                        Ok(record) => {
                            println!("{} — {}: {}", record.date, record.stage, record.analysis);
                        }
                        Err(e) => println!("(could not save growth record: {e})"),
                    },
                    Err(e) => println!("(growth analysis failed: {e})"),
                }
            }
            _ => {
                if let Some(reply) = conversation.submit(line, pending_image.take()).await {
                    println!("Kisan-Bhai: {}", reply.content);
                }
            }
        }
    }

    if let Some(session) = live.take() {
        session.stop().await;
    }
    Ok(())
}

use sdgen::{storage, Config, Egress, GenerationClient, Outcome, ProxyClient, StabilityClient};
use std::env;
use std::io::{self, BufRead, Write};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let dotenv_loaded = dotenv::dotenv().is_ok();
    sdgen::logger::init()?;
    if dotenv_loaded {
        log::info!("✅ .env file loaded");
    } else {
        log::warn!("⚠️  No .env file found");
    }

    let prompt = env::args().skip(1).collect::<Vec<_>>().join(" ");
    let config = Config::from_env();

    let egress = match env::var("SDGEN_PROXY_URL") {
        Ok(url) => Egress::Proxy(ProxyClient::new(&url)),
        Err(_) => Egress::Direct(StabilityClient::new(config.stability.clone())?),
    };
    let store = storage::credential_store(&config.storage);
    let mut client = GenerationClient::new(egress, store).await;

    while !client.has_api_key() {
        print!("Enter your API key: ");
        io::stdout().flush()?;
        let mut line = String::new();
        if io::stdin().lock().read_line(&mut line)? == 0 {
            return Ok(());
        }
        client.submit_api_key(&line).await?;
    }

    client.form_mut().prompt = prompt;
    if !client.can_submit() {
        eprintln!("usage: generate <prompt>");
        return Ok(());
    }

    match client.generate().await? {
        sdgen::ClientState::Idle {
            outcome: Some(Outcome::Image(image)),
        } => log::info!("🎨 Image generated (seed {:?})", image.seed),
        sdgen::ClientState::Idle {
            outcome: Some(Outcome::Error(message)),
        } => {
            eprintln!("{}", message);
            return Ok(());
        }
        _ => return Ok(()),
    }

    if let Some(file) = client.download(chrono::Utc::now())? {
        let path = file.save_in(env::current_dir()?)?;
        println!("{}", path.display());
    }
    Ok(())
}

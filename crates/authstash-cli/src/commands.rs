use std::sync::Arc;

use anyhow::Context;
use authstash_codec::RecordValue;
use authstash_session::{
    MutationBatch, SessionAuthState, SessionConfig, SessionKeyStore, SignalKeyStore,
};
use authstash_store::DirObjectClient;
use authstash_types::{local_file_name, ObjectLocation, RecordKey};
use colored::Colorize;
use tracing::debug;

use crate::cli::*;

pub async fn run_command(cli: Cli) -> anyhow::Result<()> {
    let config = SessionConfig::load(&cli.config)
        .with_context(|| format!("loading {}", cli.config.display()))?;
    debug!(session = %config.session_id, mode = %config.mode, "loaded config");
    let client = Arc::new(DirObjectClient::new(cli.objects_root.clone()));
    match cli.command {
        Command::Init => cmd_init(&config, client).await,
        Command::Creds => cmd_creds(&SessionKeyStore::from_config(&config, client)?).await,
        Command::Get(args) => cmd_get(&SessionKeyStore::from_config(&config, client)?, args).await,
        Command::Delete(args) => {
            cmd_delete(&SessionKeyStore::from_config(&config, client)?, args).await
        }
        Command::Location(args) => cmd_location(&config, args),
    }
}

async fn cmd_init(config: &SessionConfig, client: Arc<DirObjectClient>) -> anyhow::Result<()> {
    let state = SessionAuthState::open(config, client).await?;
    let creds = state.credentials();
    println!(
        "{} Session {} ready ({})",
        "✓".green().bold(),
        state.session_id().as_str().bold(),
        state.mode().to_string().cyan()
    );
    println!("  Registration id: {}", creds.registration_id);
    println!("  Registered: {}", creds.registered);
    Ok(())
}

async fn cmd_creds(keys: &SessionKeyStore) -> anyhow::Result<()> {
    let Some(creds) = keys.read_credentials().await? else {
        println!("No credentials stored. Run {} first.", "authstash init".bold());
        return Ok(());
    };
    let signature = match creds.verify_signed_pre_key() {
        Ok(()) => "valid".green(),
        Err(_) => "INVALID".red().bold(),
    };
    println!("Registration id: {}", creds.registration_id.to_string().bold());
    println!("Registered: {}", creds.registered);
    println!("Noise key: {}", hex::encode(&*creds.noise_key.public).yellow());
    println!(
        "Identity key: {}",
        hex::encode(&*creds.signed_identity_key.public).yellow()
    );
    println!(
        "Signed pre-key: #{} (signature {})",
        creds.signed_pre_key.key_id, signature
    );
    println!("Next pre-key id: {}", creds.next_pre_key_id);
    println!("First unuploaded pre-key id: {}", creds.first_unuploaded_pre_key_id);
    if let Some(code) = &creds.pairing_code {
        println!("Pairing code: {}", code.bold());
    }
    if !creds.extra.is_empty() {
        let fields: Vec<&str> = creds.extra.keys().map(String::as_str).collect();
        println!("Other fields: {}", fields.join(", ").dimmed());
    }
    Ok(())
}

async fn cmd_get(keys: &SessionKeyStore, args: RecordArgs) -> anyhow::Result<()> {
    let loaded = keys.load(args.category, &args.ids).await;
    for (id, result) in loaded {
        let label = RecordKey::signal(args.category, id.as_str()).to_string();
        match result {
            Ok(Some(data)) => {
                println!("{}", label.yellow().bold());
                println!("{}", render(&RecordValue::from(data))?);
            }
            Ok(None) => println!("{} {}", label.yellow(), "(absent)".dimmed()),
            Err(e) => println!("{} {} {}", label.yellow(), "error:".red().bold(), e),
        }
    }
    Ok(())
}

async fn cmd_delete(keys: &SessionKeyStore, args: RecordArgs) -> anyhow::Result<()> {
    let mut batch = MutationBatch::new();
    for id in &args.ids {
        batch = batch.delete(args.category, id.as_str());
    }
    keys.save(batch).await?;
    for id in &args.ids {
        println!("  {} {}", "deleted:".green(), RecordKey::signal(args.category, id.as_str()));
    }
    Ok(())
}

fn cmd_location(config: &SessionConfig, args: LocationArgs) -> anyhow::Result<()> {
    config.validate()?;
    let name = RecordKey::signal(args.category, args.id).storage_name();
    let object = ObjectLocation::compose(&config.object_store.bucket, &config.session_id, &name)
        .context("record name is empty")?;
    let file = local_file_name(&name).context("record name is empty")?;
    let local = config.sessions_root.join(config.session_id.as_str()).join(file);
    println!("Mode: {}", config.mode.to_string().cyan());
    println!("Object store: {}", object.to_string().yellow());
    println!("Local file: {}", local.display().to_string().yellow());
    Ok(())
}

fn render(value: &RecordValue) -> anyhow::Result<String> {
    Ok(serde_json::to_string_pretty(&value.to_json())?)
}

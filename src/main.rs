use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};

use eip712_proof::config::DeploymentProfile;
use eip712_proof::demo;
use eip712_proof::eip712::{
    get_pre_image, hash_typed_data, recover_address, verify_typed_data, Eip712Signature, TypedData,
};
use eip712_proof::provider::{LocalWallet, WalletProvider};
use eip712_proof::submit::{
    build_submission, forward_submission, process_submission, send_to_relay, ProcessOutcome,
    SubmitCommand, Submission,
};

#[derive(Parser)]
#[command(
    name = "eip712-proof",
    version,
    about = "Sign EIP-712 typed data and submit proofs to a relay"
)]
struct Cli {
    /// Deployment profile JSON file. Defaults to the built-in flat demo.
    #[arg(long, global = true)]
    profile: Option<PathBuf>,

    /// Use the built-in nested demo profile and schema
    #[arg(long, global = true)]
    nested: bool,

    /// Enable debug logging on stderr
    #[arg(long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Print the domain separator, struct hash, and final digest
    Digest {
        /// Typed data JSON file. Defaults to the built-in demo message.
        #[arg(long)]
        file: Option<PathBuf>,
    },
    /// Sign typed data and optionally submit it to the relay
    Sign {
        /// Signing key as 64 hex chars, 0x prefix optional
        #[arg(long)]
        key: String,

        /// Typed data JSON file. Defaults to the built-in demo message.
        #[arg(long)]
        file: Option<PathBuf>,

        /// POST the signed submission to the profile's relay
        #[arg(long)]
        submit: bool,

        /// Wire command for the submission
        #[arg(long, default_value = "submitProof")]
        command: String,
    },
    /// Check a signature against a claimed signer
    Verify {
        /// Typed data JSON file. Defaults to the built-in demo message.
        #[arg(long)]
        file: Option<PathBuf>,

        /// Signature as 130 hex chars, 0x prefix optional
        #[arg(long)]
        signature: String,

        /// Expected signer address
        #[arg(long)]
        signer: String,
    },
    /// Recover the signer address from a signature
    Recover {
        /// Typed data JSON file. Defaults to the built-in demo message.
        #[arg(long)]
        file: Option<PathBuf>,

        /// Signature as 130 hex chars, 0x prefix optional
        #[arg(long)]
        signature: String,
    },
    /// Verify a submission file the way the relay would
    Process {
        /// Submission JSON file
        file: PathBuf,

        /// Forward the verified call to the gateway instead of printing it
        #[arg(long)]
        forward: bool,
    },
    /// Sign a plain text message with the personal_sign prefix
    PersonalSign {
        /// Signing key as 64 hex chars, 0x prefix optional
        #[arg(long)]
        key: String,

        /// Message text to sign
        message: String,
    },
    /// Generate a fresh signing key and print its address
    Keygen,
    /// Validate the active deployment profile
    CheckConfig,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    if cli.verbose {
        eip712_proof::utils::logging::enable_debug();
    }
    let profile = load_profile(&cli)?;

    match &cli.command {
        Command::Digest { file } => {
            let typed_data = load_typed_data(&cli, &profile, file.as_deref())?;
            let pre_image = get_pre_image(&typed_data)?;
            println!("Domain separator: 0x{}", hex::encode(pre_image.domain_separator));
            println!("Struct hash:      0x{}", hex::encode(pre_image.struct_hash));
            println!("Digest:           0x{}", hex::encode(pre_image.final_hash));
        }
        Command::Sign {
            key,
            file,
            submit,
            command,
        } => {
            let typed_data = load_typed_data(&cli, &profile, file.as_deref())?;
            let wallet = LocalWallet::from_hex(key)?;
            let signature = wallet.sign_typed_data(&typed_data)?;

            println!("Signer:    {}", wallet.address()?);
            println!("Signature: {}", signature.to_hex());
            println!("v:         {}", signature.v);

            if *submit {
                let wire_command = parse_wire_command(command)?;
                let submission = build_submission(&profile, &wallet, wire_command, &typed_data)?;
                let reply = send_to_relay(&profile, &submission)?;
                println!("Relay reply: {}", serde_json::to_string_pretty(&reply)?);
            }
        }
        Command::Verify {
            file,
            signature,
            signer,
        } => {
            let typed_data = load_typed_data(&cli, &profile, file.as_deref())?;
            let parsed = Eip712Signature::from_hex(signature)?;
            if verify_typed_data(&typed_data, &parsed, signer)? {
                println!("Signature matches {}", signer);
            } else {
                bail!("signature does not match {}", signer);
            }
        }
        Command::Recover { file, signature } => {
            let typed_data = load_typed_data(&cli, &profile, file.as_deref())?;
            let parsed = Eip712Signature::from_hex(signature)?;
            let digest = hash_typed_data(&typed_data)?;
            println!("{}", recover_address(&digest, &parsed)?);
        }
        Command::Process { file, forward } => {
            let contents = fs::read_to_string(file)
                .with_context(|| format!("Failed to read {}", file.display()))?;
            let submission: Submission = serde_json::from_str(&contents)
                .with_context(|| format!("Invalid submission JSON in {}", file.display()))?;

            let types = if cli.nested {
                demo::nested_types()
            } else {
                demo::flat_types()
            };
            let outcome = process_submission(&profile, &types, "Unit", &submission)?;

            match &outcome {
                ProcessOutcome::Forward { url, args } => {
                    println!("Verified. Gateway call: POST {}", url);
                    println!("{}", serde_json::to_string_pretty(args)?);
                }
                ProcessOutcome::TestVerify { url } => {
                    println!("Gateway call: GET {}", url);
                }
                ProcessOutcome::Ignored => {
                    println!("Unknown command, acknowledged without action");
                }
            }

            if *forward {
                let reply = forward_submission(&profile, &outcome)?;
                println!("Gateway reply: {}", serde_json::to_string_pretty(&reply)?);
            }
        }
        Command::PersonalSign { key, message } => {
            let wallet = LocalWallet::from_hex(key)?;
            let signature = wallet.sign_personal(message.as_bytes())?;
            println!("Signer:    {}", wallet.address()?);
            println!("Signature: {}", signature.to_hex());
        }
        Command::Keygen => {
            let wallet = LocalWallet::random();
            println!("Private key (hex): 0x{}", wallet.key_hex());
            println!("Address:           {}", wallet.address()?);
        }
        Command::CheckConfig => {
            let warnings = profile.validate()?;
            println!("Profile:  {}", profile.name);
            println!(
                "Domain:   {} v{} (chain {})",
                profile.domain_name, profile.domain_version, profile.chain_id
            );
            println!("Contract: {}", profile.contract_address);
            println!("Relay:    {}", profile.relay_url);
            println!("Gateway:  {}", profile.rest_api_endpoint);
            for warning in warnings {
                println!("Warning:  {}", warning);
            }
        }
    }

    Ok(())
}

fn load_profile(cli: &Cli) -> Result<DeploymentProfile> {
    let mut profile = match &cli.profile {
        Some(path) => DeploymentProfile::from_json_file(path)
            .with_context(|| format!("Failed to load profile from {}", path.display()))?,
        None if cli.nested => DeploymentProfile::nested_demo(),
        None => DeploymentProfile::flat_demo(),
    };
    profile.apply_env_overrides();
    Ok(profile)
}

fn load_typed_data(
    cli: &Cli,
    profile: &DeploymentProfile,
    file: Option<&Path>,
) -> Result<TypedData> {
    match file {
        Some(path) => {
            let contents = fs::read_to_string(path)
                .with_context(|| format!("Failed to read {}", path.display()))?;
            Ok(TypedData::from_json(&contents)?)
        }
        None if cli.nested => Ok(demo::nested_typed_data(profile)),
        None => Ok(demo::flat_typed_data(profile)),
    }
}

fn parse_wire_command(command: &str) -> Result<SubmitCommand> {
    match command {
        "submitProof" => Ok(SubmitCommand::Proof),
        "submitApproval" => Ok(SubmitCommand::Approval),
        "testVerify" => Ok(SubmitCommand::TestVerify),
        other => bail!("unknown wire command: {}", other),
    }
}

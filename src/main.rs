use std::io::Read;
use std::path::PathBuf;

use anyhow::{Context, bail};
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use appstore_catalog::bundle::{BundleRef, UrlResolver};
use appstore_catalog::catalog::{
    ApplicationPayload, CatalogStore, ListFilters, Maintainer, Perspective,
};
use appstore_catalog::config::{self, CatalogConfig, DEFAULT_PAGE_LIMIT};
use appstore_catalog::identifier::AppIdentifier;

#[derive(Parser)]
#[command(name = "appstore-catalog")]
#[command(version, about = "Application version catalog administration")]
struct Cli {
    /// Path to the catalog database (defaults to the data directory)
    #[arg(long, global = true)]
    db: Option<PathBuf>,

    /// Path to a JSON configuration file
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Manage maintainers
    Maintainer {
        #[command(subcommand)]
        action: MaintainerAction,
    },
    /// Manage application versions
    App {
        #[command(subcommand)]
        action: AppAction,
    },
    /// Resolve one application version and its retrieval URL
    Get {
        /// Application identifier: appId[:version|latest]
        id: String,
        /// Read as this maintainer instead of the device perspective
        #[arg(long)]
        maintainer: Option<String>,
        /// Target platform name (native bundles)
        #[arg(long)]
        platform: Option<String>,
        /// Target firmware version (native bundles)
        #[arg(long)]
        firmware: Option<String>,
    },
    /// List catalog entries
    List {
        /// List as this maintainer instead of the device perspective
        #[arg(long)]
        maintainer: Option<String>,
        #[arg(long)]
        name: Option<String>,
        #[arg(long)]
        description: Option<String>,
        #[arg(long)]
        version: Option<String>,
        #[arg(long = "type")]
        app_type: Option<String>,
        #[arg(long)]
        category: Option<String>,
        #[arg(long)]
        architecture: Option<String>,
        #[arg(long)]
        variant: Option<String>,
        #[arg(long)]
        os: Option<String>,
        #[arg(long, default_value_t = 0)]
        offset: u64,
        #[arg(long, default_value_t = DEFAULT_PAGE_LIMIT)]
        limit: u64,
    },
}

#[derive(Subcommand)]
enum MaintainerAction {
    /// Register a new maintainer
    Add {
        code: String,
        #[arg(long)]
        name: String,
        #[arg(long)]
        address: Option<String>,
        #[arg(long)]
        homepage: Option<String>,
        #[arg(long)]
        email: Option<String>,
    },
    /// List maintainers
    List {
        /// Substring filter on the display name
        #[arg(long)]
        name: Option<String>,
        #[arg(long, default_value_t = 0)]
        offset: u64,
        #[arg(long, default_value_t = DEFAULT_PAGE_LIMIT)]
        limit: u64,
    },
    /// Update a maintainer's descriptive fields
    Update {
        code: String,
        #[arg(long)]
        name: String,
        #[arg(long)]
        address: Option<String>,
        #[arg(long)]
        homepage: Option<String>,
        #[arg(long)]
        email: Option<String>,
    },
    /// Delete a maintainer (must own no versions)
    Rm { code: String },
}

#[derive(Subcommand)]
enum AppAction {
    /// Add a version: appId:version plus a JSON payload
    Add {
        maintainer: String,
        /// Application identifier with an explicit version: appId:version
        id: String,
        /// Payload JSON file; reads stdin when omitted
        #[arg(long)]
        payload: Option<PathBuf>,
    },
    /// Update a version in place: appId[:version|latest]
    Update {
        maintainer: String,
        id: String,
        #[arg(long)]
        payload: Option<PathBuf>,
    },
    /// Delete version(s): appId[:version|latest|all]
    Rm { maintainer: String, id: String },
}

fn init_logging() -> anyhow::Result<tracing_appender::non_blocking::WorkerGuard> {
    let log_path = config::log_path();
    if let Some(dir) = log_path.parent() {
        std::fs::create_dir_all(dir)?;
    }
    let appender = tracing_appender::rolling::never(
        log_path.parent().unwrap_or_else(|| std::path::Path::new(".")),
        log_path
            .file_name()
            .map(|n| n.to_os_string())
            .unwrap_or_else(|| "appstore-catalog.log".into()),
    );
    let (writer, guard) = tracing_appender::non_blocking(appender);
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(writer)
        .with_ansi(false)
        .init();
    Ok(guard)
}

fn read_payload(path: Option<&PathBuf>) -> anyhow::Result<ApplicationPayload> {
    let contents = match path {
        Some(path) => std::fs::read_to_string(path)
            .with_context(|| format!("reading payload from {}", path.display()))?,
        None => {
            let mut buf = String::new();
            std::io::stdin().read_to_string(&mut buf)?;
            buf
        }
    };
    serde_json::from_str(&contents).context("parsing payload JSON")
}

fn print_json<T: serde::Serialize>(value: &T) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let _guard = init_logging()?;

    let cfg = CatalogConfig::load(cli.config.as_deref())?;
    let db_path = cli.db.clone().unwrap_or_else(config::db_path);
    if let Some(dir) = db_path.parent() {
        std::fs::create_dir_all(dir)?;
    }
    let store = CatalogStore::new(&db_path)?;

    match cli.command {
        Command::Maintainer { action } => match action {
            MaintainerAction::Add {
                code,
                name,
                address,
                homepage,
                email,
            } => {
                store.create_maintainer(&Maintainer {
                    code,
                    name,
                    address,
                    homepage,
                    email,
                })?;
            }
            MaintainerAction::List {
                name,
                offset,
                limit,
            } => {
                let page = store.list_maintainers(name.as_deref(), offset, limit)?;
                print_json(&page)?;
            }
            MaintainerAction::Update {
                code,
                name,
                address,
                homepage,
                email,
            } => {
                let updated = store.update_maintainer(
                    &code,
                    &Maintainer {
                        code: code.clone(),
                        name,
                        address,
                        homepage,
                        email,
                    },
                )?;
                if !updated {
                    bail!("maintainer not found: {code}");
                }
            }
            MaintainerAction::Rm { code } => {
                if !store.delete_maintainer(&code)? {
                    bail!("maintainer not found: {code}");
                }
            }
        },

        Command::App { action } => match action {
            AppAction::Add {
                maintainer,
                id,
                payload,
            } => {
                let id: AppIdentifier = id.parse()?;
                let Some(version) = id.selector.exact() else {
                    bail!("adding a version requires an explicit appId:version");
                };
                let payload = read_payload(payload.as_ref())?;
                store.add_version(&maintainer, &id.app_id, version, &payload)?;
            }
            AppAction::Update {
                maintainer,
                id,
                payload,
            } => {
                let id: AppIdentifier = id.parse()?;
                let payload = read_payload(payload.as_ref())?;
                let updated =
                    store.update_version(&maintainer, &id.app_id, &id.selector, &payload)?;
                if !updated {
                    bail!("no matching version for {id}");
                }
            }
            AppAction::Rm { maintainer, id } => {
                let id: AppIdentifier = id.parse()?;
                if !store.delete_version(&maintainer, &id.app_id, &id.selector)? {
                    bail!("no matching version for {id}");
                }
            }
        },

        Command::Get {
            id,
            maintainer,
            platform,
            firmware,
        } => {
            let id: AppIdentifier = id.parse()?;
            let perspective = match maintainer {
                Some(code) => Perspective::Maintainer(code),
                None => Perspective::Stb,
            };
            let Some(details) = store.get_details(&perspective, &id.app_id, &id.selector)? else {
                bail!("application not found: {id}");
            };

            let resolver = UrlResolver::new(
                cfg.bundles.protocol.clone(),
                cfg.bundles.host.clone(),
                cfg.bundles.web_app_types.iter().cloned(),
            );
            let url = resolver.resolve(
                BundleRef {
                    app_id: &details.app_id,
                    version: &details.version,
                    app_type: &details.payload.app_type,
                    source_url: details.payload.source_url.as_deref(),
                },
                platform.as_deref(),
                firmware.as_deref(),
            )?;

            let mut rendered = serde_json::to_value(&details)?;
            rendered["url"] = serde_json::Value::String(url);
            print_json(&rendered)?;
        }

        Command::List {
            maintainer,
            name,
            description,
            version,
            app_type,
            category,
            architecture,
            variant,
            os,
            offset,
            limit,
        } => {
            let perspective = match maintainer {
                Some(code) => Perspective::Maintainer(code),
                None => Perspective::Stb,
            };
            let filters = ListFilters {
                name,
                description,
                version,
                app_type,
                category,
                platform_architecture: architecture,
                platform_variant: variant,
                platform_os: os,
            };
            let page = store.list_versions(&perspective, &filters, offset, limit)?;
            print_json(&page)?;
        }
    }

    Ok(())
}

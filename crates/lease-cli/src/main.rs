//! lease - housing marketplace for a university community

mod cli;
mod output;

use std::env;
use std::io;
use std::process::ExitCode;

use anyhow::Result;
use clap::Parser;
use lease_core::config::LeaseConfig;
use lease_core::core::{CoreContext, CoreError, ErrorKind};
use lease_core::store::ListingFilter;
use tracing_subscriber::{fmt, EnvFilter};

use cli::commands::{
    run_init, run_listings_create, run_listings_delete, run_listings_list, run_listings_show,
    run_listings_update, run_messages_conversations, run_messages_delete, run_messages_read,
    run_messages_send, run_messages_show, run_messages_unread, run_ratings_reconcile,
    run_reviews_create, run_reviews_delete, run_reviews_list, run_reviews_mine,
    run_reviews_update, run_users_lookup, run_users_register, run_users_show,
};
use cli::{
    Cli, Commands, ListingsCommands, MessagesCommands, RatingsCommands, ReviewsCommands,
    UsersCommands,
};
use output::OutputFormat;

/// Filter directives for log output (e.g. `lease_core=debug`).
const LOG_VAR: &str = "LEASE_LOG";
/// Set to `json` for structured log lines.
const LOG_FORMAT_VAR: &str = "LEASE_LOG_FORMAT";

fn main() -> ExitCode {
    init_tracing();
    let cli = Cli::parse();

    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("error: {err:#}");
            ExitCode::from(exit_code(&err))
        }
    }
}

fn init_tracing() {
    let filter = EnvFilter::try_from_env(LOG_VAR).unwrap_or_else(|_| EnvFilter::new("warn"));
    let json = env::var(LOG_FORMAT_VAR).is_ok_and(|v| v.eq_ignore_ascii_case("json"));

    let builder = fmt().with_env_filter(filter).with_writer(io::stderr);
    let result = if json {
        builder.json().try_init()
    } else {
        builder.try_init()
    };
    if let Err(e) = result {
        eprintln!("warning: tracing init failed: {e}");
    }
}

/// Exit status for a failed command, by error kind.
fn exit_code(err: &anyhow::Error) -> u8 {
    match err.downcast_ref::<CoreError>().map(CoreError::kind) {
        Some(ErrorKind::InvalidInput) => 2,
        Some(ErrorKind::NotFound) => 3,
        Some(ErrorKind::Forbidden) => 4,
        Some(ErrorKind::Conflict) => 5,
        Some(ErrorKind::AggregationFailure) => 6,
        Some(ErrorKind::Internal) | None => 1,
    }
}

fn run(cli: Cli) -> Result<()> {
    let ctx = CoreContext::new(LeaseConfig::resolve(
        cli.db.as_deref(),
        cli.email_domain.as_deref(),
    ));

    let format = if cli.json {
        OutputFormat::Json
    } else {
        OutputFormat::Text
    };
    let actor = cli.actor.as_deref();

    match cli.command {
        Commands::Init => {
            run_init(&ctx, format)?;
        }

        Commands::Users(cmd) => match cmd {
            UsersCommands::Register {
                name,
                email,
                password_hash,
            } => {
                run_users_register(&ctx, &name, &email, &password_hash, format)?;
            }
            UsersCommands::Show { user_id } => {
                run_users_show(&ctx, &user_id, format)?;
            }
            UsersCommands::Lookup { email } => {
                run_users_lookup(&ctx, &email, format)?;
            }
        },

        Commands::Listings(cmd) => match cmd {
            ListingsCommands::Create(fields) => {
                run_listings_create(&ctx, fields, actor, format)?;
            }
            ListingsCommands::List {
                search,
                availability,
                max_price,
                min_bedrooms,
                owner,
            } => {
                let filter = ListingFilter {
                    search,
                    availability,
                    max_price,
                    min_bedrooms,
                    owner_id: owner,
                };
                run_listings_list(&ctx, &filter, format)?;
            }
            ListingsCommands::Show { listing_id } => {
                run_listings_show(&ctx, &listing_id, format)?;
            }
            ListingsCommands::Update { listing_id, patch } => {
                run_listings_update(&ctx, &listing_id, patch, actor, format)?;
            }
            ListingsCommands::Delete { listing_id } => {
                run_listings_delete(&ctx, &listing_id, actor, format)?;
            }
        },

        Commands::Reviews(cmd) => match cmd {
            ReviewsCommands::Create {
                listing_id,
                rating,
                comment,
            } => {
                run_reviews_create(&ctx, &listing_id, rating, &comment, actor, format)?;
            }
            ReviewsCommands::List { listing_id } => {
                run_reviews_list(&ctx, &listing_id, format)?;
            }
            ReviewsCommands::Mine { listing_id } => {
                run_reviews_mine(&ctx, &listing_id, actor, format)?;
            }
            ReviewsCommands::Update {
                review_id,
                rating,
                comment,
            } => {
                run_reviews_update(
                    &ctx,
                    &review_id,
                    rating,
                    comment.as_deref(),
                    actor,
                    format,
                )?;
            }
            ReviewsCommands::Delete { review_id } => {
                run_reviews_delete(&ctx, &review_id, actor, format)?;
            }
        },

        Commands::Ratings(cmd) => match cmd {
            RatingsCommands::Reconcile { listing_id } => {
                run_ratings_reconcile(&ctx, listing_id.as_deref(), format)?;
            }
        },

        Commands::Messages(cmd) => match cmd {
            MessagesCommands::Send {
                receiver_id,
                message,
                listing,
            } => {
                run_messages_send(
                    &ctx,
                    &receiver_id,
                    &message,
                    listing.as_deref(),
                    actor,
                    format,
                )?;
            }
            MessagesCommands::Conversations => {
                run_messages_conversations(&ctx, actor, format)?;
            }
            MessagesCommands::Show { partner_id } => {
                run_messages_show(&ctx, &partner_id, actor, format)?;
            }
            MessagesCommands::Read { partner_id } => {
                run_messages_read(&ctx, &partner_id, actor, format)?;
            }
            MessagesCommands::Unread => {
                run_messages_unread(&ctx, actor, format)?;
            }
            MessagesCommands::Delete { message_id } => {
                run_messages_delete(&ctx, &message_id, actor, format)?;
            }
        },
    }

    Ok(())
}

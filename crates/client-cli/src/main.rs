use anyhow::Result;
use clap::{Args, Parser, Subcommand};
use shared::{BookingId, BookingStatus};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use taxi_client::config::Config;
use taxi_client::notify::{Action, Notice};
use taxi_client::render;
use taxi_client::state::{AdminView, Page};
use taxi_client::tui::Dashboard;
use taxi_client::validation::BookingForm;
use taxi_client::BookingDesk;

#[derive(Parser)]
#[command(name = "taxi")]
#[command(about = "Book taxi rides, check their status and manage bookings")]
#[command(version)]
struct Cli {
    /// Backend API base URL (overrides config)
    #[arg(long, global = true)]
    api_url: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Check that the booking backend is reachable
    Health,
    /// Show a page: home, booking (book), status, availability, admin
    Open {
        page: Page,
    },
    /// Book a ride
    Book(BookArgs),
    /// Look up a booking by id and phone number
    Status {
        /// Booking ID
        #[arg(long)]
        id: Option<String>,
        /// Phone number used for the booking
        #[arg(long)]
        phone: Option<String>,
    },
    /// Admin actions on bookings
    Admin {
        #[command(flatten)]
        login: LoginArgs,
        #[command(subcommand)]
        action: AdminAction,
    },
    /// Interactive admin dashboard
    Dashboard {
        #[command(flatten)]
        login: LoginArgs,
    },
    /// Manage configuration
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(Args)]
struct BookArgs {
    /// Passenger name
    #[arg(long, default_value = "")]
    name: String,
    /// Contact phone number
    #[arg(long, default_value = "")]
    phone: String,
    /// Pickup location
    #[arg(long, default_value = "")]
    pickup: String,
    /// Drop location
    #[arg(long, default_value = "")]
    drop: String,
    /// Pickup time, e.g. 2030-01-01T10:30
    #[arg(long, default_value = "")]
    datetime: String,
    /// Number of seats (1-6)
    #[arg(long, default_value = "")]
    seats: String,
}

#[derive(Args)]
struct LoginArgs {
    /// Admin username
    #[arg(long)]
    username: String,
    /// Admin password
    #[arg(long)]
    password: String,
}

#[derive(Subcommand)]
enum AdminAction {
    /// Show all bookings, newest first
    List,
    /// Confirm a pending booking
    Confirm { id: BookingId },
    /// Reject a pending booking
    Reject { id: BookingId },
    /// Toggle public seat availability for this session
    Availability,
}

#[derive(Subcommand)]
enum ConfigAction {
    /// Set a configuration value
    Set {
        /// Configuration key (e.g. api.base_url, admin.username)
        key: String,
        /// Configuration value
        value: String,
    },
    /// Get a configuration value
    Get {
        /// Configuration key
        key: String,
    },
    /// Show all configuration
    Show,
    /// Get the config file path
    Path,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // The dashboard owns the terminal; keep it quiet unless RUST_LOG says otherwise
    let default_filter = match cli.command {
        Commands::Dashboard { .. } => "off",
        _ => "taxi=info,taxi_client=info",
    };
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| default_filter.into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let command = match cli.command {
        Commands::Config { action } => return handle_config_command(action),
        other => other,
    };

    let mut config = Config::load()?;
    if let Some(url) = cli.api_url {
        config.api.base_url = url.trim_end_matches('/').to_string();
    }
    let desk = BookingDesk::new(config)?;

    match command {
        Commands::Health => match desk.health().await {
            Ok(health) => {
                println!("status: {}", health.status);
                for (key, value) in &health.details {
                    println!("{}: {}", key, value);
                }
            }
            Err(e) => Notice::from_error(Action::Health, &e).print(),
        },
        Commands::Open { page } => open(&desk, page),
        Commands::Book(args) => book(&desk, args).await,
        Commands::Status { id, phone } => {
            desk.navigate(Page::Status);
            match desk.lookup(&id.unwrap_or_default(), &phone.unwrap_or_default()).await {
                Ok(_) => {
                    if let Some(view) = desk.status_view() {
                        println!("{}", render::status_text(&view));
                    }
                }
                Err(e) => Notice::from_error(Action::Lookup, &e).print(),
            }
        }
        Commands::Admin { login, action } => {
            if !admin_login(&desk, &login).await {
                return Ok(());
            }
            match action {
                AdminAction::List => {}
                AdminAction::Confirm { id } => update(&desk, id, BookingStatus::Confirmed).await,
                AdminAction::Reject { id } => update(&desk, id, BookingStatus::Rejected).await,
                AdminAction::Availability => match desk.toggle_availability() {
                    Ok(availability) => Notice::info(format!("Seat availability: {}", availability)).print(),
                    Err(e) => Notice::from_error(Action::Update, &e).print(),
                },
            }
            println!("{}", render::table_text(&desk.rows()));
        }
        Commands::Dashboard { login } => {
            if !admin_login(&desk, &login).await {
                return Ok(());
            }
            let runtime = tokio::runtime::Handle::current();
            let mut dashboard = Dashboard::new(desk, runtime);
            tokio::task::spawn_blocking(move || dashboard.run()).await??;
        }
        Commands::Config { .. } => unreachable!("handled above"),
    }

    Ok(())
}

async fn book(desk: &BookingDesk, args: BookArgs) {
    desk.navigate(Page::Booking);
    let mut form = BookingForm {
        name: args.name,
        phone: args.phone,
        pickup: args.pickup,
        drop: args.drop,
        datetime: args.datetime,
        seats: args.seats,
    };
    if form.datetime.trim().is_empty() {
        if let Some(earliest) = desk.earliest_pickup() {
            eprintln!("Earliest pickup time: {}", earliest);
        }
    }

    match desk.submit(&mut form).await {
        Ok(submission) => {
            Notice::submitted(&submission).print();
            if let Some(id) = desk.status_prefill() {
                println!(
                    "Check your booking status with: taxi status --id {} --phone {}",
                    id, submission.booking.phone
                );
            }
        }
        Err(e) => Notice::from_error(Action::Submit, &e).print(),
    }
}

fn open(desk: &BookingDesk, page: Page) {
    let admin_view = desk.navigate(page);
    match page {
        Page::Home => {
            println!("Taxi booking");
            println!("  taxi book      book a ride");
            println!("  taxi status    check a booking");
            println!("  taxi admin     manage bookings");
        }
        Page::Booking => {
            if let Some(earliest) = desk.earliest_pickup() {
                println!("Earliest pickup time: {}", earliest);
            }
            println!("taxi book --name NAME --phone PHONE --pickup FROM --drop TO --datetime YYYY-MM-DDTHH:MM --seats N");
        }
        Page::Status => println!("taxi status --id BOOKING_ID --phone PHONE"),
        Page::Availability => println!("Seat availability: {}", desk.availability()),
        Page::Admin => match admin_view {
            Some(AdminView::Dashboard) => println!("{}", render::table_text(&desk.rows())),
            _ => println!("Log in with: taxi admin --username USER --password PASS list"),
        },
    }
}

/// Returns false when the credentials were refused
async fn admin_login(desk: &BookingDesk, login: &LoginArgs) -> bool {
    match desk.login(&login.username, &login.password).await {
        Ok(loaded) => {
            Notice::success("Admin login successful").print();
            if let Err(e) = loaded {
                Notice::from_error(Action::Load, &e).print();
            }
            true
        }
        Err(e) => {
            Notice::from_error(Action::Login, &e).print();
            false
        }
    }
}

async fn update(desk: &BookingDesk, id: BookingId, status: BookingStatus) {
    match desk.update_status(id, status).await {
        Ok(change) => Notice::status_changed(&change).print(),
        Err(e) => Notice::from_error(Action::Update, &e).print(),
    }
}

fn handle_config_command(action: ConfigAction) -> Result<()> {
    match action {
        ConfigAction::Set { key, value } => {
            let mut config = Config::load()?;
            config.set(&key, &value)?;
            config.save()?;
            println!("Configuration saved");
        }
        ConfigAction::Get { key } => {
            let config = Config::load()?;
            println!("{}", config.get(&key)?);
        }
        ConfigAction::Show => {
            let config = Config::load()?;
            for key in Config::KEYS {
                println!("{}: {}", key, config.get(key)?);
            }
        }
        ConfigAction::Path => {
            let path = Config::config_path()?;
            println!("{}", path.display());
        }
    }
    Ok(())
}

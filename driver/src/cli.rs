use std::path::PathBuf;

use bookings::{BookingStatus, ListFilter};
use chrono::NaiveDate;
use clap::{Parser, Subcommand, ValueEnum};

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum StatusCli {
    Pending,
    Booked,
}

#[derive(Debug, Parser)]
#[clap(name = "courtbot", version)]
pub struct Cli {
    /// Credentials JSON file (overrides COURTBOT_CREDENTIALS)
    #[clap(long, global = true)]
    pub credentials: Option<PathBuf>,

    /// Desired-booking database URL (overrides DATABASE_URL)
    #[clap(long, global = true)]
    pub database: Option<String>,

    /// Venue configuration JSON (overrides COURTBOT_VENUE)
    #[clap(long, global = true)]
    pub venue: Option<PathBuf>,

    #[clap(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Try to book every pending request inside the lookahead window
    Run {
        /// Override the venue's lookahead window
        #[clap(long)]
        lookahead_days: Option<i64>,
    },

    /// Queue a desired booking
    Add {
        /// Calendar date, YYYY-MM-DD
        #[clap(long)]
        date: String,

        /// Start time, HH:MM
        #[clap(long)]
        time: String,
    },

    /// Delete a desired booking
    Remove {
        #[clap(long)]
        id: i64,
    },

    /// Show desired bookings; without --status only today's and later ones
    List {
        #[clap(long, value_enum)]
        status: Option<StatusCli>,
    },
}

/// Convert CLI status selection → stored status
pub(crate) fn cli_to_status(s: StatusCli) -> BookingStatus {
    match s {
        StatusCli::Pending => BookingStatus::Pending,
        StatusCli::Booked => BookingStatus::Booked,
    }
}

impl Command {
    /// What `list` shows when run on `today`.
    pub fn list_filter(&self, today: NaiveDate) -> ListFilter {
        match self {
            Command::List {
                status: Some(status),
            } => ListFilter::Status(cli_to_status(*status)),
            _ => ListFilter::Upcoming(today),
        }
    }
}

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use common_enums::{Currency, OrderType, PaymentMethod};
use rust_decimal::Decimal;

#[derive(Debug, Parser)]
#[command(name = "cafe-client")]
#[command(about = "KHQR payments and checkout against the cafe backend", long_about = None)]
#[command(version)]
pub struct Cli {
    /// Configuration file; defaults to config/<environment>.toml
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Generate a KHQR payload for the configured merchant
    Generate {
        /// Amount to charge; omit for a static code
        #[arg(short, long)]
        amount: Option<Decimal>,

        /// Overrides the merchant currency
        #[arg(long)]
        currency: Option<Currency>,

        /// Bill number carried in the additional data field
        #[arg(short, long)]
        bill_number: Option<String>,

        /// Write the QR code as a PNG image
        #[arg(long)]
        qr_out: Option<PathBuf>,

        /// Dark module color of the PNG, as a hex string
        #[arg(long, requires = "qr_out")]
        color: Option<String>,
    },

    /// Check the CRC of a KHQR payload and print its fields
    Decode {
        payload: String,
    },

    /// Print the MD5 fingerprint of a KHQR payload
    Fingerprint {
        payload: String,
    },

    /// Ask the configured verifier whether a payment has settled
    Verify {
        /// MD5 fingerprint of the displayed KHQR payload
        md5: String,

        /// Keep polling until paid or the poll policy gives up
        #[arg(short, long)]
        wait: bool,
    },

    /// List the orders placed with a phone number
    Orders {
        phone: String,
    },

    /// List open orders for the staff queue
    Queue {
        /// Comma separated order statuses
        #[arg(long)]
        status: Option<String>,

        #[arg(long)]
        limit: Option<u32>,
    },

    /// Run a checkout for a cart file and wait for the payment
    Checkout {
        /// JSON array of cart items
        #[arg(long)]
        cart: PathBuf,

        #[arg(long)]
        phone: String,

        #[arg(long)]
        name: Option<String>,

        #[arg(long, default_value_t = PaymentMethod::AcledaKhqr)]
        method: PaymentMethod,

        #[arg(long, default_value_t = OrderType::Takeaway)]
        order_type: OrderType,

        #[arg(long)]
        table: Option<String>,
    },
}

use std::fs::File;
use std::io::Read;
use std::path::PathBuf;

use anyhow::{Context, Result};
use log::*;
use serde::Deserialize;
use structopt::StructOpt;

use infra::ids::Id;
use restopos::cart::{CartStore, Mesa, ShowCart};
use restopos::menu::{Product, ProductQuery};
use restopos::navigation;
use restopos::notifications::{Notifier, TerminalNotifier};
use restopos::orders::CancelOrder;
use restopos::services::{Commandable, Queryable};

#[derive(Debug, StructOpt)]
#[structopt(name = "pos", about = "Restaurant till")]
struct Opt {
    /// Config file
    #[structopt(parse(from_os_str))]
    config: PathBuf,
    #[structopt(subcommand)]
    command: Commands,
}

#[derive(Debug, StructOpt)]
enum Commands {
    #[structopt(name = "menu", about = "Show the menu")]
    Menu {
        #[structopt(long = "category")]
        category: Option<String>,
    },
    #[structopt(name = "cart", about = "Show the purchase summary")]
    Cart,
    #[structopt(name = "add", about = "Add a product to the cart")]
    Add {
        product: Id<Product>,
        #[structopt(short = "n", long = "cantidad", default_value = "1")]
        cantidad: u32,
    },
    #[structopt(name = "remove", about = "Remove a cart entry by position")]
    Remove { index: usize },
    #[structopt(name = "table", about = "Select the table for this order")]
    Table { mesa: Id<Mesa> },
    #[structopt(name = "cancel", about = "Drop every product, keep the table")]
    Cancel,
    #[structopt(name = "checkout", about = "Pay and send the order")]
    Checkout { amount: String },
    #[structopt(name = "login", about = "Sign in with a role")]
    Login { role: String },
    #[structopt(name = "logout", about = "Sign out")]
    Logout,
    #[structopt(name = "nav", about = "Show navigation for the signed-in role")]
    Nav,
}

#[derive(Deserialize, Debug)]
struct Config {
    #[serde(flatten)]
    pos: restopos::config::Config,
    #[serde(default)]
    env_logger: restopos::config::EnvLogger,
}

fn main() -> Result<()> {
    let opt = Opt::from_args();

    let mut config_buf = String::new();
    File::open(&opt.config)
        .and_then(|mut f| f.read_to_string(&mut config_buf))
        .with_context(|| format!("read {:?}", opt.config))?;
    let mut config: Config = toml::from_str(&config_buf).context("parse config")?;
    config.pos.apply_env()?;

    config.env_logger.builder().init();
    debug!("Options: {:?}", opt);

    let pos = restopos::Pos::new(&config.pos)?;
    let notifier = TerminalNotifier;

    match opt.command {
        Commands::Menu { category } => {
            let query = category.map(ProductQuery::Category).unwrap_or_default();
            let page = pos.menu_page(query)?;
            print!("{}", page);
        }
        Commands::Cart => {
            println!("{}", pos.cart().query(ShowCart)?);
        }
        Commands::Add { product, cantidad } => {
            let product = pos.add_product(product, cantidad)?;
            println!("{} x{} añadido", product.nombre, cantidad);
        }
        Commands::Remove { index } => match pos.cart().remove_from_cart(index)? {
            Some(entry) => debug!("Removed {:?}", entry),
            None => println!("No hay entrada {}", index),
        },
        Commands::Table { mesa } => {
            pos.cart().select_table(mesa)?;
            println!("Mesa: {}", mesa.get());
        }
        Commands::Cancel => {
            pos.checkout().execute(CancelOrder)?;
        }
        Commands::Checkout { amount } => match pos.checkout().submit(&amount) {
            Ok(receipt) => {
                notifier.notify(&receipt.notice());
                if receipt.change > 0.0 {
                    println!(
                        "Cambio: ${}",
                        restopos::page::format_price(receipt.change)
                    );
                }
            }
            Err(e) => {
                debug!("Checkout stopped: {}", e);
                notifier.notify(&e.notice());
            }
        },
        Commands::Login { role } => {
            let role = pos.session().login(&role)?;
            println!("Sesión: {}", role);
        }
        Commands::Logout => {
            let dest = pos.session().logout()?;
            println!("→ {}", dest);
        }
        Commands::Nav => {
            let session = pos.session();
            let role = session.get_user_data()?;
            if let Some(since) = session.since()? {
                println!("Sesión: {} desde {}", role, since.format("%Y-%m-%d %H:%M"));
            }
            for bar in navigation::nav_bars(&role) {
                println!("{}", bar);
            }
        }
    }

    Ok(())
}

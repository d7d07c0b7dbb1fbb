use std::sync::Arc;

use clap::{Parser, Subcommand};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use solar_storefront::{
    auth::AuthSession,
    cart::{Cart, CartStore},
    checkout,
    client::ApiClient,
    config::StorefrontConfig,
    dto::{
        enquiries::{CreateEnquiryRequest, EnquiryListQuery},
        orders::CustomerDetails,
        products::ProductQuery,
    },
    models::{Address, EnquiryStatus, Product},
    response::ApiResult,
    services::{admin_service, enquiry_service, notification_service, order_service, product_service},
    storage::{JsonFileStore, SharedStore},
    util::format_currency,
};

#[derive(Debug, Parser)]
#[command(name = "storefront", about = "Browse the catalogue, manage the guest cart and check out")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// List catalogue products.
    Products {
        #[arg(long)]
        search: Option<String>,
        #[arg(long)]
        category: Option<String>,
        #[arg(long, default_value_t = 1)]
        page: i64,
    },
    /// Show one product.
    Product { id: i64 },
    #[command(subcommand)]
    Cart(CartCommand),
    /// Place an order for the current cart.
    Checkout {
        #[arg(long)]
        name: String,
        #[arg(long)]
        email: String,
        #[arg(long)]
        phone: Option<String>,
        #[arg(long)]
        street: String,
        #[arg(long)]
        city: String,
        #[arg(long)]
        postal_code: Option<String>,
        #[arg(long, default_value = "eft")]
        payment_method: String,
    },
    /// Look up an order by its number.
    Track { order_number: String },
    /// Send an enquiry to the sales team.
    Enquire {
        #[arg(long)]
        name: String,
        #[arg(long)]
        email: String,
        #[arg(long)]
        phone: Option<String>,
        #[arg(long)]
        subject: String,
        #[arg(long)]
        message: String,
        #[arg(long)]
        product_id: Option<i64>,
    },
    Login {
        #[arg(long)]
        email: String,
        #[arg(long, env = "STOREFRONT_PASSWORD")]
        password: String,
    },
    Logout,
    Whoami,
    #[command(subcommand)]
    Admin(AdminCommand),
}

#[derive(Debug, Subcommand)]
enum CartCommand {
    Show,
    Add {
        product_id: i64,
        #[arg(long, default_value_t = 1)]
        quantity: u32,
    },
    Update { product_id: i64, quantity: u32 },
    Remove { product_id: i64 },
    Clear,
}

#[derive(Debug, Subcommand)]
enum AdminCommand {
    Dashboard,
    Enquiries {
        #[arg(long)]
        new_only: bool,
    },
    Respond { enquiry_id: i64, response: String },
    Notifications,
}

struct App {
    client: ApiClient,
    auth: AuthSession,
    cart: CartStore,
    currency: String,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "warn,solar_storefront=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();
    let config = StorefrontConfig::from_env()?;
    let store: SharedStore = Arc::new(JsonFileStore::open(config.storage_path.clone()).await?);
    let client = ApiClient::new(&config, store.clone())?;
    let auth = AuthSession::new(client.clone());
    auth.initialize().await?;
    let cart = CartStore::load(store).await?;

    let app = App {
        client,
        auth,
        cart,
        currency: config.currency_symbol,
    };
    run(&app, cli.command).await
}

async fn run(app: &App, command: Command) -> anyhow::Result<()> {
    match command {
        Command::Products {
            search,
            category,
            page,
        } => {
            let query = ProductQuery {
                page: Some(page),
                per_page: Some(20),
                search,
                category,
                ..ProductQuery::default()
            };
            let page = shown(product_service::list_products(&app.client, &query).await?)?;
            for product in &page.items {
                print_product_line(app, product);
            }
            println!("{} of {} products", page.items.len(), page.total());
        }
        Command::Product { id } => {
            let product = shown(product_service::get_product(&app.client, id).await?)?;
            print_product_line(app, &product);
            if let Some(description) = &product.description {
                println!("\n{description}");
            }
            for feature in &product.features {
                println!("  * {feature}");
            }
            for (key, value) in &product.specifications {
                println!("  {key}: {value}");
            }
        }
        Command::Cart(cart_command) => run_cart(app, cart_command).await?,
        Command::Checkout {
            name,
            email,
            phone,
            street,
            city,
            postal_code,
            payment_method,
        } => {
            let customer = CustomerDetails {
                name,
                email,
                phone,
                shipping_address: Address {
                    street,
                    city,
                    postal_code,
                    ..Address::default()
                },
                notes: None,
            };
            let order = shown(
                checkout::place_order(&app.client, &app.cart, &customer, &payment_method).await?,
            )?;
            println!(
                "Order {} placed, total {}",
                order.order_number,
                format_currency(order.total, &app.currency)
            );
        }
        Command::Track { order_number } => {
            let order = shown(order_service::track_order(&app.client, &order_number).await?)?;
            println!(
                "{}: {:?} / payment {:?}",
                order.order_number, order.status, order.payment_status
            );
            if let Some(tracking) = &order.tracking_number {
                println!("tracking number {tracking}");
            }
        }
        Command::Enquire {
            name,
            email,
            phone,
            subject,
            message,
            product_id,
        } => {
            let payload = CreateEnquiryRequest {
                name,
                email,
                phone,
                company: None,
                subject,
                message,
                product_id,
            };
            let enquiry = shown(enquiry_service::submit_enquiry(&app.client, &payload).await?)?;
            println!("Enquiry #{} received, we'll be in touch", enquiry.id);
        }
        Command::Login { email, password } => {
            let user = shown(app.auth.login(&email, &password).await?)?;
            println!("Signed in as {} <{}>", user.name, user.email);
        }
        Command::Logout => {
            app.auth.logout().await?;
            println!("Signed out");
        }
        Command::Whoami => match app.auth.user() {
            Some(user) => println!("{} <{}> ({:?})", user.name, user.email, user.role),
            None => println!("Not signed in"),
        },
        Command::Admin(admin_command) => run_admin(app, admin_command).await?,
    }
    Ok(())
}

async fn run_cart(app: &App, command: CartCommand) -> anyhow::Result<()> {
    let cart = match command {
        CartCommand::Show => app.cart.cart().await,
        CartCommand::Add {
            product_id,
            quantity,
        } => {
            let product = shown(product_service::get_product(&app.client, product_id).await?)?;
            app.cart.add_to_cart(&product, quantity).await?
        }
        CartCommand::Update {
            product_id,
            quantity,
        } => app.cart.update_quantity(product_id, quantity).await?,
        CartCommand::Remove { product_id } => app.cart.remove_from_cart(product_id).await?,
        CartCommand::Clear => app.cart.clear_cart().await?,
    };
    print_cart(app, &cart);
    Ok(())
}

async fn run_admin(app: &App, command: AdminCommand) -> anyhow::Result<()> {
    if !app.auth.is_admin() {
        anyhow::bail!("admin commands require an admin sign-in");
    }
    match command {
        AdminCommand::Dashboard => {
            let stats = shown(admin_service::dashboard_stats(&app.client).await?)?;
            println!("products        {}", stats.total_products);
            println!("orders          {} ({} pending)", stats.total_orders, stats.pending_orders);
            println!("new enquiries   {}", stats.new_enquiries);
            println!("low stock       {}", stats.low_stock_products);
            println!("revenue         {}", format_currency(stats.total_revenue, &app.currency));
        }
        AdminCommand::Enquiries { new_only } => {
            let query = EnquiryListQuery {
                status: new_only.then_some(EnquiryStatus::New),
                ..EnquiryListQuery::default()
            };
            let page = shown(enquiry_service::list_enquiries(&app.client, &query).await?)?;
            for enquiry in &page.items {
                println!(
                    "#{:<5} {:<12?} {:<8?} {} <{}>: {}",
                    enquiry.id,
                    enquiry.status,
                    enquiry.priority,
                    enquiry.name,
                    enquiry.email,
                    enquiry.subject
                );
            }
        }
        AdminCommand::Respond {
            enquiry_id,
            response,
        } => {
            let enquiry = shown(
                enquiry_service::respond_to_enquiry(&app.client, enquiry_id, &response).await?,
            )?;
            println!("Enquiry #{} is now {:?}", enquiry.id, enquiry.status);
        }
        AdminCommand::Notifications => {
            let unread = notification_service::unread_count_or_zero(&app.client).await;
            println!("{unread} unread");
            let page = shown(notification_service::list_notifications(&app.client, false).await?)?;
            for note in &page.items {
                let marker = if note.read { " " } else { "*" };
                println!("{marker} {}: {}", note.title, note.message);
            }
        }
    }
    Ok(())
}

/// Application failures become a printable error for the terminal.
fn shown<T>(reply: ApiResult<T>) -> anyhow::Result<T> {
    reply.map_err(|failure| anyhow::anyhow!(failure.message))
}

fn print_product_line(app: &App, product: &Product) {
    println!(
        "#{:<5} {:<40} {:>14}  {}",
        product.id,
        product.name,
        format_currency(product.price, &app.currency),
        product.status.label()
    );
}

fn print_cart(app: &App, cart: &Cart) {
    if cart.is_empty() {
        println!("Your cart is empty");
        return;
    }
    for item in cart.items() {
        println!(
            "{:>3} x {:<40} {:>14}",
            item.quantity(),
            item.product().name,
            format_currency(item.total(), &app.currency)
        );
    }
    println!(
        "{} items, total {}",
        cart.total_items(),
        format_currency(cart.total(), &app.currency)
    );
}

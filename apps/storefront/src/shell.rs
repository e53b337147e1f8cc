//! # Storefront Shell
//!
//! A line-oriented front end: one command per input line, one JSON object
//! per output line.
//!
//! ```text
//!   > add 3f1c... M --qty 2
//!   {"ok":true,"data":{"items":[...],"totals":{...},...}}
//!   > coupon nope
//!   {"ok":false,"error":{"code":"NOT_FOUND","message":"Invalid or expired coupon"}}
//! ```
//!
//! Lines are split on whitespace; single or double quotes keep a phrase
//! together (`register "Ana Souza" ana@example.com s3nha`).
//!
//! Admin order statuses may be given in English or Portuguese
//! (`admin order-status 3f1c... pago`).

use chrono::NaiveDate;
use clap::{Args, Parser, Subcommand};
use serde::Serialize;
use serde_json::Value;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt};
use tracing::{debug, info};

use crate::commands::admin::StockLevel;
use crate::commands::cart::AddToCart;
use crate::commands::catalog::ProductQuery;
use crate::commands::{account, admin, cart, catalog, orders};
use crate::error::{ApiError, ApiResult};
use crate::state::{AppState, Session};
use vitrine_core::{CouponDraft, CouponKind, Gender, Money, OrderStatus, ProductDraft};

// =============================================================================
// Grammar
// =============================================================================

#[derive(Debug, Parser)]
#[command(name = "vitrine", no_binary_name = true, disable_version_flag = true)]
struct Line {
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// List categories
    Categories,
    /// List sizes
    Sizes,
    /// List products
    Products {
        #[arg(long)]
        category: Option<String>,
        #[arg(long)]
        gender: Option<Gender>,
        #[arg(long)]
        search: Option<String>,
        #[arg(long)]
        featured: bool,
        #[arg(long)]
        trending: bool,
        #[arg(long = "new")]
        is_new: bool,
    },
    /// Show a product with its sizes
    Product { id: String },
    /// Add a product in a size to the cart
    Add {
        product_id: String,
        size: String,
        #[arg(long, default_value_t = 1)]
        qty: i64,
    },
    /// Change a line's quantity by a delta
    Qty {
        line_id: String,
        #[arg(allow_negative_numbers = true)]
        delta: i64,
    },
    /// Remove a line
    Rm { line_id: String },
    /// Show the cart
    Cart,
    /// Apply a coupon code
    Coupon { code: String },
    /// Remove the applied coupon
    Uncoupon,
    /// Show what checkout would charge
    Checkout,
    /// Place an order for the cart
    Order,
    /// List your orders
    Orders,
    /// Show one of your orders with its lines
    OrderShow { id: String },
    /// Create an account and log in
    Register {
        name: String,
        email: String,
        password: String,
        #[arg(long)]
        phone: Option<String>,
    },
    Login {
        email: String,
        password: String,
    },
    Logout,
    /// Show the logged-in account
    Me,
    /// Back-office commands
    #[command(subcommand)]
    Admin(AdminCommand),
    #[command(alias = "exit")]
    Quit,
}

#[derive(Debug, Subcommand)]
enum AdminCommand {
    Coupons,
    CouponAdd(CouponArgs),
    CouponEdit {
        id: String,
        #[command(flatten)]
        coupon: CouponArgs,
    },
    CouponRm { id: String },
    CategoryAdd { name: String },
    CategoryRm { id: String },
    SizeAdd {
        name: String,
        #[arg(long, default_value_t = 0)]
        order: i64,
    },
    ProductAdd(ProductArgs),
    ProductEdit {
        id: String,
        #[command(flatten)]
        product: ProductArgs,
    },
    /// Hide a product from listings
    ProductHide { id: String },
    ProductRm { id: String },
    /// Set stock levels: `stock <product> <size_id>=<qty>...`
    Stock {
        product_id: String,
        #[arg(required = true, value_parser = parse_stock_level)]
        levels: Vec<StockLevel>,
    },
    StockRm { product_id: String, size_id: String },
    /// Every order, newest first
    Orders,
    OrderStatus { id: String, status: String },
    Dashboard,
}

#[derive(Debug, Args)]
struct CouponArgs {
    code: String,
    /// percentage | fixed
    kind: CouponKind,
    /// "10" (percent) or "50.00" (amount)
    value: String,
    /// Minimum spend, e.g. "200.00"
    #[arg(long, default_value = "0")]
    min: Money,
    /// Last valid day, YYYY-MM-DD
    #[arg(long)]
    expires: NaiveDate,
    #[arg(long)]
    inactive: bool,
}

impl CouponArgs {
    fn into_draft(self) -> ApiResult<CouponDraft> {
        Ok(CouponDraft {
            value: self.kind.parse_value(&self.value)?,
            code: self.code,
            kind: self.kind,
            minimum_spend_cents: self.min.cents(),
            expires_on: self.expires,
            active: !self.inactive,
        })
    }
}

#[derive(Debug, Args)]
struct ProductArgs {
    name: String,
    /// Price, e.g. "49.90"
    price: Money,
    #[arg(long)]
    category: Option<String>,
    #[arg(long)]
    gender: Option<Gender>,
    #[arg(long)]
    description: Option<String>,
    #[arg(long)]
    featured: bool,
    #[arg(long)]
    trending: bool,
    #[arg(long = "new")]
    is_new: bool,
    #[arg(long)]
    image: Option<String>,
}

impl From<ProductArgs> for ProductDraft {
    fn from(args: ProductArgs) -> Self {
        ProductDraft {
            category_id: args.category,
            name: args.name,
            description: args.description,
            price_cents: args.price.cents(),
            gender: args.gender,
            featured: args.featured,
            trending: args.trending,
            is_new: args.is_new,
            image_url: args.image,
        }
    }
}

fn parse_stock_level(raw: &str) -> Result<StockLevel, String> {
    let (size_id, quantity) = raw
        .split_once('=')
        .ok_or_else(|| format!("expected <size_id>=<qty>, got '{}'", raw))?;
    let quantity = quantity
        .trim()
        .parse::<i64>()
        .map_err(|e| format!("bad quantity in '{}': {}", raw, e))?;
    Ok(StockLevel {
        size_id: size_id.trim().to_string(),
        quantity,
    })
}

/// Splits a line into words, keeping quoted phrases whole.
fn tokenize(line: &str) -> Result<Vec<String>, String> {
    let mut words = Vec::new();
    let mut current = String::new();
    let mut in_word = false;
    let mut quote: Option<char> = None;

    for c in line.chars() {
        match quote {
            Some(q) if c == q => quote = None,
            Some(_) => current.push(c),
            None if c == '"' || c == '\'' => {
                quote = Some(c);
                in_word = true;
            }
            None if c.is_whitespace() => {
                if in_word {
                    words.push(std::mem::take(&mut current));
                    in_word = false;
                }
            }
            None => {
                current.push(c);
                in_word = true;
            }
        }
    }

    if quote.is_some() {
        return Err("unterminated quote".to_string());
    }
    if in_word {
        words.push(current);
    }
    Ok(words)
}

// =============================================================================
// Replies
// =============================================================================

/// One output line.
#[derive(Debug, Clone, Serialize)]
pub struct Reply {
    pub ok: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<ApiError>,
    #[serde(skip)]
    pub quit: bool,
}

impl Reply {
    fn data(data: Value) -> Self {
        Reply {
            ok: true,
            data: Some(data),
            error: None,
            quit: false,
        }
    }

    fn error(error: ApiError) -> Self {
        Reply {
            ok: false,
            data: None,
            error: Some(error),
            quit: false,
        }
    }
}

fn json<T: Serialize>(value: T) -> ApiResult<Value> {
    serde_json::to_value(value).map_err(|e| ApiError::internal(e.to_string()))
}

// =============================================================================
// Shell
// =============================================================================

pub struct Shell {
    app: AppState,
    session: Session,
}

impl Shell {
    pub fn new(app: AppState, session: Session) -> Self {
        Shell { app, session }
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    /// Runs one input line. Blank lines give no reply.
    pub async fn handle_line(&mut self, line: &str) -> Option<Reply> {
        let words = match tokenize(line) {
            Ok(words) if words.is_empty() => return None,
            Ok(words) => words,
            Err(e) => return Some(Reply::error(ApiError::validation(e))),
        };

        let parsed = match Line::try_parse_from(&words) {
            Ok(parsed) => parsed,
            Err(e) => {
                use clap::error::ErrorKind;
                let text = e.render().to_string().trim().to_string();
                return Some(match e.kind() {
                    ErrorKind::DisplayHelp
                    | ErrorKind::DisplayHelpOnMissingArgumentOrSubcommand => {
                        Reply::data(Value::String(text))
                    }
                    _ => Reply::error(ApiError::validation(text)),
                });
            }
        };

        if let Command::Quit = parsed.command {
            return Some(Reply {
                quit: true,
                ..Reply::data(Value::String("bye".to_string()))
            });
        }

        debug!(command = ?parsed.command, "Shell command");
        Some(match self.execute(parsed.command).await {
            Ok(data) => Reply::data(data),
            Err(e) => Reply::error(e),
        })
    }

    async fn execute(&mut self, command: Command) -> ApiResult<Value> {
        let app = &self.app;
        let session = &mut self.session;

        match command {
            Command::Categories => json(catalog::list_categories(app).await?),
            Command::Sizes => json(catalog::list_sizes(app).await?),
            Command::Products {
                category,
                gender,
                search,
                featured,
                trending,
                is_new,
            } => {
                let query = ProductQuery {
                    category,
                    gender,
                    search,
                    featured,
                    trending,
                    is_new,
                };
                json(catalog::list_products(app, query).await?)
            }
            Command::Product { id } => json(catalog::get_product(app, &id).await?),

            Command::Add {
                product_id,
                size,
                qty,
            } => {
                let request = AddToCart {
                    product_id,
                    size,
                    quantity: qty,
                };
                json(cart::add_to_cart(app, session, request).await?)
            }
            Command::Qty { line_id, delta } => {
                json(cart::update_cart_item(app, session, &line_id, delta).await?)
            }
            Command::Rm { line_id } => json(cart::remove_from_cart(app, session, &line_id).await?),
            Command::Cart => json(cart::get_cart(app, session)),
            Command::Coupon { code } => json(cart::apply_coupon(app, session, &code).await?),
            Command::Uncoupon => json(cart::remove_coupon(app, session)),
            Command::Checkout => json(cart::checkout(session).await?),
            Command::Order => json(orders::place_order(app, session).await?),
            Command::Orders => json(orders::my_orders(app, session).await?),
            Command::OrderShow { id } => json(orders::get_order(app, session, &id).await?),

            Command::Register {
                name,
                email,
                password,
                phone,
            } => {
                let request = account::RegisterRequest {
                    name,
                    email,
                    password,
                    phone,
                };
                json(account::register(app, session, request).await?)
            }
            Command::Login { email, password } => {
                json(account::login(app, session, &email, &password).await?)
            }
            Command::Logout => {
                account::logout(session);
                json(cart::get_cart(app, session))
            }
            Command::Me => json(account::me(app, session).await?),

            Command::Admin(command) => execute_admin(app, session, command).await,
            Command::Quit => Ok(Value::Null),
        }
    }

    /// Reads commands until end of input or `quit`.
    pub async fn run<R, W>(&mut self, reader: R, mut writer: W) -> std::io::Result<()>
    where
        R: AsyncBufRead + Unpin,
        W: AsyncWrite + Unpin,
    {
        let mut lines = reader.lines();

        while let Some(line) = lines.next_line().await? {
            let Some(reply) = self.handle_line(&line).await else {
                continue;
            };

            let mut out = serde_json::to_vec(&reply)?;
            out.push(b'\n');
            writer.write_all(&out).await?;
            writer.flush().await?;

            if reply.quit {
                break;
            }
        }

        info!("Shell closed");
        Ok(())
    }
}

async fn execute_admin(
    app: &AppState,
    session: &Session,
    command: AdminCommand,
) -> ApiResult<Value> {
    match command {
        AdminCommand::Coupons => json(admin::list_coupons(app, session).await?),
        AdminCommand::CouponAdd(args) => {
            json(admin::create_coupon(app, session, args.into_draft()?).await?)
        }
        AdminCommand::CouponEdit { id, coupon } => {
            json(admin::update_coupon(app, session, &id, coupon.into_draft()?).await?)
        }
        AdminCommand::CouponRm { id } => json(admin::delete_coupon(app, session, &id).await?),
        AdminCommand::CategoryAdd { name } => json(admin::create_category(app, session, &name).await?),
        AdminCommand::CategoryRm { id } => json(admin::delete_category(app, session, &id).await?),
        AdminCommand::SizeAdd { name, order } => {
            json(admin::create_size(app, session, &name, order).await?)
        }
        AdminCommand::ProductAdd(args) => {
            json(admin::create_product(app, session, args.into()).await?)
        }
        AdminCommand::ProductEdit { id, product } => {
            json(admin::update_product(app, session, &id, product.into()).await?)
        }
        AdminCommand::ProductHide { id } => {
            json(admin::deactivate_product(app, session, &id).await?)
        }
        AdminCommand::ProductRm { id } => json(admin::delete_product(app, session, &id).await?),
        AdminCommand::Stock { product_id, levels } => {
            json(admin::set_stock(app, session, &product_id, levels).await?)
        }
        AdminCommand::StockRm {
            product_id,
            size_id,
        } => json(admin::delete_stock(app, session, &product_id, &size_id).await?),
        AdminCommand::Orders => json(orders::list_orders(app, session).await?),
        AdminCommand::OrderStatus { id, status } => {
            let status = status.parse::<OrderStatus>()?;
            json(orders::update_order_status(app, session, &id, status).await?)
        }
        AdminCommand::Dashboard => json(orders::dashboard(app, session).await?),
    }
}

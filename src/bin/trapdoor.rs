//! CLI wrapper for the trapdoor proxy core.
//!
//! Usage:
//!   trapdoor rewrite <url> --base <url>      # Real address to proxy address
//!   trapdoor unrewrite <url>                 # Proxy address to real address
//!   trapdoor demo                            # Hook a realm and show what page code sees

use std::error::Error;
use std::path::PathBuf;
use std::process;
use std::rc::Rc;

use clap::{Args, Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use trapdoor::config::ProxyConfig;
use trapdoor::rewriter::{CodecKind, UrlMeta, UrlRewriter};
use trapdoor::runner::ds::object::{get_named, set_named};
use trapdoor::runner::ds::realm::Realm;
use trapdoor::runner::ds::value::JsValue;
use trapdoor::runner::hook::{AccessorHandlers, HandlerSet, InterceptionRegistry, SetOutcome};
use trapdoor::runner::host::{call_method, construct_global, create_element, install_host_interfaces};

const DEFAULT_ORIGIN: &str = "http://localhost:1337";

#[derive(Parser)]
#[command(name = "trapdoor", version, about = "Proxy URL transcoding and native interception")]
struct Cli {
    /// Log at debug level (otherwise RUST_LOG is honored)
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Rewrite a real address into the proxy origin
    Rewrite {
        url: String,

        /// Base URL relative addresses resolve against
        #[arg(long)]
        base: String,

        #[command(flatten)]
        proxy: ProxyArgs,
    },
    /// Turn a proxy address back into the real one
    Unrewrite {
        url: String,

        #[command(flatten)]
        proxy: ProxyArgs,
    },
    /// Hook a host realm and print what page code observes
    Demo {
        /// Real address of the demo document
        #[arg(long, default_value = "https://example.com/articles/")]
        document: String,

        #[command(flatten)]
        proxy: ProxyArgs,
    },
}

#[derive(Args)]
struct ProxyArgs {
    /// TOML config file; flags below override its values
    #[arg(long)]
    config: Option<PathBuf>,

    /// Proxy origin
    #[arg(long)]
    origin: Option<String>,

    /// Proxy path prefix
    #[arg(long)]
    prefix: Option<String>,

    /// Address codec: plain, base64, xor or none
    #[arg(long)]
    codec: Option<CodecKind>,
}

impl ProxyArgs {
    fn load(&self) -> Result<ProxyConfig, Box<dyn Error>> {
        let mut config = match &self.config {
            Some(path) => ProxyConfig::load(path)?,
            None => ProxyConfig::new(DEFAULT_ORIGIN),
        };
        if let Some(origin) = &self.origin {
            config.origin = origin.clone();
        }
        if let Some(prefix) = &self.prefix {
            config.prefix = prefix.clone();
        }
        if let Some(codec) = self.codec {
            config.codec = codec;
        }
        config.validate()?;
        Ok(config)
    }
}

fn main() {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let result = match cli.command {
        Commands::Rewrite { url, base, proxy } => run_rewrite(&url, &base, &proxy),
        Commands::Unrewrite { url, proxy } => run_unrewrite(&url, &proxy),
        Commands::Demo { document, proxy } => run_demo(&document, &proxy),
    };

    if let Err(e) = result {
        tracing::error!(error = %e, "command failed");
        eprintln!("trapdoor: {}", e);
        process::exit(1);
    }
}

/// Initialise tracing with stderr output.
fn init_tracing(verbose: bool) {
    let filter = if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::from_default_env()
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn run_rewrite(url: &str, base: &str, proxy: &ProxyArgs) -> Result<(), Box<dyn Error>> {
    let rewriter = proxy.load()?.rewriter();
    let meta = UrlMeta::for_document(base)?;
    println!("{}", rewriter.rewrite(url, &meta));
    Ok(())
}

fn run_unrewrite(url: &str, proxy: &ProxyArgs) -> Result<(), Box<dyn Error>> {
    let rewriter = proxy.load()?.rewriter();
    println!("{}", rewriter.unrewrite(url));
    Ok(())
}

fn run_demo(document: &str, proxy: &ProxyArgs) -> Result<(), Box<dyn Error>> {
    let rewriter = Rc::new(proxy.load()?.rewriter());
    let meta = Rc::new(UrlMeta::for_document(document)?);
    let proxied_document = rewriter.rewrite(document, &meta);

    let realm = Rc::new(Realm::new());
    install_host_interfaces(&realm, &proxied_document)?;
    let registry = InterceptionRegistry::new(realm.clone());
    install_url_traps(&registry, &rewriter, &meta)?;

    println!("realm            {}", realm.id());
    println!("document         {}", proxied_document);
    println!("overrides        {}", registry.registered_targets().join(", "));

    let a = create_element(&realm, "a")?;
    set_named(&a, "href", JsValue::from("../about#team"))?;
    println!("a.href           {}", get_named(&a, "href")?.to_js_string());
    println!(
        "a attribute      {}",
        call_method(&a, "getAttribute", vec![JsValue::from("href")])?.to_js_string()
    );

    let audio = construct_global(&realm, "Audio", vec![JsValue::from("media/intro.mp3")])?;
    if let JsValue::Object(audio) = audio {
        println!("audio.src        {}", get_named(&audio, "src")?.to_js_string());
        println!(
            "audio attribute  {}",
            call_method(&audio, "getAttribute", vec![JsValue::from("src")])?.to_js_string()
        );
    }
    Ok(())
}

/// Anchor/area `href` and media `src` read back real addresses and store
/// proxied ones; `new Audio(src)` gets a proxied `src`.
fn install_url_traps(
    registry: &InterceptionRegistry,
    rewriter: &Rc<UrlRewriter>,
    meta: &Rc<UrlMeta>,
) -> Result<(), Box<dyn Error>> {
    let (get_rw, set_rw, set_meta) = (rewriter.clone(), rewriter.clone(), meta.clone());
    let href = AccessorHandlers::new()
        .get(move |ctx| {
            let proxied = ctx.get()?;
            if proxied.is_empty_or_nullish() {
                return Ok(Some(proxied));
            }
            Ok(Some(JsValue::from(get_rw.unrewrite(&proxied.to_js_string()))))
        })
        .set(move |ctx, value| {
            ctx.set(JsValue::from(set_rw.rewrite(&value.to_js_string(), &set_meta)))?;
            Ok(SetOutcome::Handled)
        });
    registry.register(
        [
            "HTMLAnchorElement.prototype.href",
            "HTMLAreaElement.prototype.href",
            "HTMLMediaElement.prototype.src",
        ],
        &HandlerSet::accessor(href),
    )?;

    let (ctor_rw, ctor_meta) = (rewriter.clone(), meta.clone());
    registry.register(
        ["Audio"],
        &HandlerSet::constructor(move |ctx| {
            let src = ctx.arg(0);
            if !src.is_undefined() {
                ctx.set_arg(0, JsValue::from(ctor_rw.rewrite(&src.to_js_string(), &ctor_meta)));
            }
            Ok(())
        }),
    )?;
    Ok(())
}

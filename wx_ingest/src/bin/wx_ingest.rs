/*
 * Licensed under the Apache License, Version 2.0 (the "License");
 * you may not use this file except in compliance with the License.
 * You may obtain a copy of the License at http://www.apache.org/licenses/LICENSE-2.0.
 *
 * Unless required by applicable law or agreed to in writing, software distributed under
 * the License is distributed on an "AS IS" BASIS, WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND,
 * either express or implied. See the License for the specific language governing permissions
 * and limitations under the License.
 */

use clap::Parser;
use reqwest::Client;
use tracing_subscriber::EnvFilter;

use wx_ingest::{load_config, run_ingest_for_models, Result, WxIngestConfig};
use wx_model::ModelRegistry;

#[derive(Parser, Debug)]
#[command(version, about = "one-shot NWP ingestion: Fetcher -> Step Aligner -> Grid Store Adapter")]
pub struct Args {
    /// model name(s), comma-separated or repeated (e.g. icon, icon-eu, icon-d2, gfs)
    #[arg(long, env = "MODELS", value_delimiter = ',', default_value = "icon")]
    pub models: Vec<String>,

    /// parameter names, comma-separated; defaults to the full catalog
    #[arg(short = 'p', long, env = "PARAMS", value_delimiter = ',')]
    pub params: Vec<String>,

    /// request fast (per-parameter-parallel) ingestion; the Memory Governor may still downgrade
    /// this to serial if free memory is short
    #[arg(long, env = "FAST")]
    pub fast: bool,

    /// wx_ingest.ron filename, looked up via WX_CONFIG_DIR/configs/<bin>/configs
    #[arg(long, env = "CONFIG", default_value = "wx_ingest.ron")]
    pub config: String,

    /// repeat for more verbose logging (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,
}

fn init_logging (verbose: u8) {
    let default_level = match verbose {
        0 => "wx_ingest=info",
        1 => "wx_ingest=debug",
        _ => "wx_ingest=trace,wx_fetch=trace,wx_align=trace,wx_store=trace",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else( |_| EnvFilter::new(default_level));
    tracing_subscriber::fmt().with_env_filter(filter).init();
}

#[tokio::main]
async fn main() -> Result<()> {
    wx_build::set_bin_context!();

    let args = Args::parse();
    init_logging(args.verbose);

    let cfg: WxIngestConfig = load_config(&args.config)?;
    let registry = ModelRegistry::new();
    let store = wx_store::GridStore::new(&cfg.store_root);
    let client = Client::new();

    let params = if args.params.is_empty() {
        wx_catalog::all().iter().collect::<Vec<_>>()
    } else {
        args.params.iter().filter_map( |name| wx_catalog::by_name(name)).collect()
    };

    let free_bytes = wx_ingest::scheduler::free_memory();
    let fast = wx_ingest::scheduler::decide_mode(args.fast, params.len(), cfg.gib_per_parameter, free_bytes);

    run_ingest_for_models(&registry, &args.models, &params, &store, &cfg, &client, fast).await
}

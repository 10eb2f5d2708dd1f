//! three_wards: smallest end-to-end run of the wardsim engine.
//!
//! Three wards of 1000 people on a line, commuting inward to the middle
//! ward, with ten infections seeded in ward 0 on day 0.  Parameters, the
//! network and the seed file are embedded CSV so the run is self-contained;
//! output goes to `output/three_wards` (or the directory given as the first
//! argument).

use std::io::Cursor;
use std::path::PathBuf;
use std::time::Instant;

use anyhow::{Context, Result};
use log::{LevelFilter, info};
use log4rs::Config;
use log4rs::append::console::ConsoleAppender;
use log4rs::config::{Appender, Root};
use log4rs::encode::pattern::PatternEncoder;

use ws_core::{Parameters, RandomStream, SimConfig};
use ws_infection::read_done_reader;
use ws_network::{LinkKind, load_network_reader};
use ws_output::{CsvWriter, SimOutputObserver};
use ws_sim::SimBuilder;

// ── Constants ─────────────────────────────────────────────────────────────────

const SEED:             u64 = 15_324;
const PARAMETER_LINE:   usize = 0;
const MAX_DAYS:         u32 = 365;
const SNAPSHOT_DAYS:    u32 = 7;
const LOG_PATTERN:      &str = "{d(%Y-%m-%dT%H:%M:%SZ)} {h({l})} {t} - {m}{n}";

// ── Embedded inputs ───────────────────────────────────────────────────────────

const PARAMETERS_CSV: &str = "\
# one scenario per line\n\
beta[2],beta[3],progress[1],progress[2],progress[3],too_ill_to_move[3],uv\n\
0.95,0.95,0.19,0.91,0.29,0.8,1.0\n\
0.50,0.50,0.19,0.91,0.29,0.8,0.8\n\
";

const WARDS_CSV: &str = "\
ward,population,name,x,y\n\
0,1000,north,0,0\n\
1,1000,centre,5,0\n\
2,1000,south,10,0\n\
";

const LINKS_CSV: &str = "\
from,to,weight,kind,distance\n\
0,1,300,work,\n\
2,1,250,work,\n\
1,1,400,work,\n\
0,1,1,play,\n\
1,0,1,play,\n\
1,2,1,play,\n\
2,1,1,play,\n\
";

const SEEDS_CSV: &str = "\
ward,day,count\n\
0,0,10\n\
";

// ── Logging ───────────────────────────────────────────────────────────────────

fn init_logging() -> Result<()> {
    let stdout = ConsoleAppender::builder()
        .encoder(Box::new(PatternEncoder::new(LOG_PATTERN)))
        .build();
    let config = Config::builder()
        .appender(Appender::builder().build("stdout", Box::new(stdout)))
        .build(Root::builder().appender("stdout").build(LevelFilter::Info))
        .context("building log config")?;
    log4rs::init_config(config).context("installing logger")?;
    Ok(())
}

// ── main ──────────────────────────────────────────────────────────────────────

fn main() -> Result<()> {
    init_logging()?;

    let out_dir = std::env::args()
        .nth(1)
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from("output/three_wards"));

    // 1. Parameters: one line of the scenario table over the defaults.
    let mut parameters = Parameters::default();
    parameters
        .read_reader(Cursor::new(PARAMETERS_CSV), PARAMETER_LINE)
        .context("reading parameters")?;

    // 2. Seeds and network.
    let seeds = read_done_reader(Cursor::new(SEEDS_CSV)).context("reading seeds")?;
    let network = load_network_reader(Cursor::new(WARDS_CSV), Cursor::new(LINKS_CSV))
        .context("loading network")?;
    info!(
        "network: {} wards, {} work links, {} play links, population {}",
        network.ward_count(),
        network.links(LinkKind::Work).len(),
        network.links(LinkKind::Play).len(),
        network.total_population(),
    );

    // 3. Network-dependent tweaks, then freeze and initialise.
    let mut rng = RandomStream::new(SEED);
    let builder = SimBuilder::new(parameters)
        .network(network)
        .configure(|p, net| {
            p.dyn_dist_cutoff = net.min_max_distance().1 + 1.0;
            p.static_play_at_home = 0.0;
            p.play_to_work = 0.0;
            p.work_to_play = 0.0;
            p.daily_imports = 0.0;
        })
        .initialise(&mut rng)?
        .seeds(seeds)?;

    let config = SimConfig {
        max_days:               MAX_DAYS,
        num_threads:            None,
        snapshot_interval_days: SNAPSHOT_DAYS,
    };
    let mut sim = builder.build(config, rng)?;

    // 4. Output.
    std::fs::create_dir_all(&out_dir)
        .with_context(|| format!("creating {}", out_dir.display()))?;
    let mut obs = SimOutputObserver::new(CsvWriter::new(&out_dir)?);

    // 5. Run.
    let t0 = Instant::now();
    let summary = sim.run(&mut obs)?;
    let elapsed = t0.elapsed();

    if let Some(e) = obs.take_error() {
        eprintln!("output error: {e}");
    }

    // 6. Summary.
    println!();
    println!("Simulation complete in {:.3} s ({:?})", elapsed.as_secs_f64(), summary.stop);
    println!("  days run         : {}", summary.days_run);
    println!("  total infections : {}", summary.total_infections);
    match summary.peak_day {
        Some(day) => println!("  peak             : {} infected on {day}", summary.peak_infected),
        None => println!("  peak             : none"),
    }
    println!();

    let disease = &sim.params.disease;
    println!("{:<14} {:>10}", "Stage", "Final");
    println!("{}", "-".repeat(25));
    for (stage, count) in disease.stage_ids().zip(&summary.final_totals) {
        println!("{:<14} {:>10}", disease.stage_name(stage), count);
    }
    println!();
    println!("Output written to {}", out_dir.display());

    Ok(())
}

//! Type-state builder for constructing a [`Sim`].
//!
//! The construction order of a run is fixed: the network must exist before
//! parameters can depend on it, parameters are frozen before the infection
//! state is allocated, and the state is reset and rebalanced before seeds
//! are validated against it.  Each stage is a distinct type, so calling the
//! steps out of order does not compile.
//!
//! ```text
//! SimBuilder::new(parameters)            SimBuilder<Configure>
//!   .network(network)                    SimBuilder<Networked>
//!   .configure(|params, network| ..)
//!   .initialise(&mut rng)?               SimBuilder<Initialised>
//!   .seeds(records)?
//!   .build(config, rng)?                 Sim
//! ```

use log::info;

use ws_core::{Day, ParameterSet, Parameters, RandomStream, SimConfig};
use ws_infection::{read_done_file, ImportSeeder, InfectionState, SeedRecord, SeedSchedule};
use ws_movement::{move_population, rescale_play_matrix, MovementReport, PlayMatrix};
use ws_network::WardNetwork;

use crate::transmission::Transmission;
use crate::{Sim, SimError, SimResult};

// ── Stages ────────────────────────────────────────────────────────────────────

/// Parameters loaded, no network yet.
pub struct Configure {
    parameters: Parameters,
}

/// Network attached; parameters may still be adjusted.
pub struct Networked {
    parameters: Parameters,
    network:    WardNetwork,
}

/// Parameters frozen, state reset and rebalanced.
pub struct Initialised {
    params:      ParameterSet,
    network:     WardNetwork,
    state:       InfectionState,
    play_matrix: PlayMatrix,
    movement:    MovementReport,
    schedule:    SeedSchedule,
}

/// Fluent, staged builder for [`Sim`].
///
/// # Example
///
/// ```rust,ignore
/// let mut rng = RandomStream::new(15324);
/// let mut sim = SimBuilder::new(parameters)
///     .network(network)
///     .configure(|p, net| p.dyn_dist_cutoff = net.min_max_distance().1 + 1.0)
///     .initialise(&mut rng)?
///     .seeds(records)?
///     .build(config, rng)?;
/// sim.run(&mut NoopObserver)?;
/// ```
pub struct SimBuilder<S = Configure> {
    stage: S,
}

// ── Configure ─────────────────────────────────────────────────────────────────

impl SimBuilder<Configure> {
    pub fn new(parameters: Parameters) -> Self {
        Self { stage: Configure { parameters } }
    }

    pub fn parameters(&self) -> &Parameters {
        &self.stage.parameters
    }

    /// Attach an already-built network.
    pub fn network(self, network: WardNetwork) -> SimBuilder<Networked> {
        SimBuilder {
            stage: Networked { parameters: self.stage.parameters, network },
        }
    }

    /// Load the network named by the parameters' input files.
    pub fn load_network(self) -> SimResult<SimBuilder<Networked>> {
        let network = WardNetwork::build(&self.stage.parameters)?;
        Ok(self.network(network))
    }
}

// ── Networked ─────────────────────────────────────────────────────────────────

impl SimBuilder<Networked> {
    pub fn parameters(&self) -> &Parameters {
        &self.stage.parameters
    }

    pub fn network_ref(&self) -> &WardNetwork {
        &self.stage.network
    }

    /// Adjust parameters that depend on the network, such as the distance
    /// cutoff.
    pub fn configure(mut self, f: impl FnOnce(&mut Parameters, &WardNetwork)) -> Self {
        f(&mut self.stage.parameters, &self.stage.network);
        self
    }

    /// Freeze the parameters, allocate and reset the infection state,
    /// rescale the play matrix and rebalance the pools.
    ///
    /// `rng` is the run's master stream; rebalancing under stochastic
    /// rounding draws from it.
    pub fn initialise(self, rng: &mut RandomStream) -> SimResult<SimBuilder<Initialised>> {
        let Networked { parameters, network } = self.stage;
        let params = parameters.finalize()?;

        let mut state = InfectionState::initialise(&network, &params)?;
        state
            .reset(&params)
            .map_err(|e| SimError::consistency(Day::ZERO, e, &state))?;
        let play_matrix = rescale_play_matrix(&network, &params);
        let movement = move_population(&mut state, &params, rng)
            .map_err(|e| SimError::consistency(Day::ZERO, e, &state))?;

        info!(
            "initialised {} wards, population {}, {} stages; moved {} play→home, {} home→play",
            state.ward_count(),
            state.total_population(),
            state.stage_count(),
            movement.play_to_home,
            movement.home_to_play,
        );

        Ok(SimBuilder {
            stage: Initialised {
                params,
                network,
                state,
                play_matrix,
                movement,
                schedule: SeedSchedule::empty(),
            },
        })
    }
}

// ── Initialised ───────────────────────────────────────────────────────────────

impl SimBuilder<Initialised> {
    pub fn params(&self) -> &ParameterSet {
        &self.stage.params
    }

    pub fn network_ref(&self) -> &WardNetwork {
        &self.stage.network
    }

    pub fn state(&self) -> &InfectionState {
        &self.stage.state
    }

    pub fn play_matrix(&self) -> &PlayMatrix {
        &self.stage.play_matrix
    }

    /// What the initial rebalance moved.
    pub fn movement(&self) -> MovementReport {
        self.stage.movement
    }

    /// Validate and install the seed schedule.
    pub fn seeds(mut self, records: Vec<SeedRecord>) -> SimResult<Self> {
        self.stage.schedule = SeedSchedule::new(
            records,
            self.stage.network.ward_count(),
            self.stage.params.seed_policy,
        )?;
        Ok(self)
    }

    /// Read and install the seed file named by the parameters, if any.
    pub fn load_seeds(self) -> SimResult<Self> {
        match self.stage.params.input_files.seeds.clone() {
            Some(path) => {
                let records = read_done_file(&path)?;
                self.seeds(records)
            }
            None => Ok(self),
        }
    }

    /// Validate `config` and return a ready-to-run [`Sim`] that takes
    /// ownership of `rng`.
    pub fn build(self, config: SimConfig, rng: RandomStream) -> SimResult<Sim> {
        if config.num_threads == Some(0) {
            return Err(SimError::Config("num_threads must be at least 1".into()));
        }

        #[cfg(feature = "parallel")]
        let pool = match config.num_threads {
            Some(n) => Some(
                rayon::ThreadPoolBuilder::new()
                    .num_threads(n)
                    .build()
                    .map_err(|e| SimError::Config(e.to_string()))?,
            ),
            None => None,
        };

        let Initialised { params, network, state, play_matrix, schedule, .. } = self.stage;
        let transmission = Transmission::new(&network, &play_matrix, &params);
        let seeder = ImportSeeder::new(&params);

        info!(
            "sim ready: up to {} days, {} seed records, {} daily imports",
            config.max_days,
            schedule.len(),
            params.daily_imports,
        );

        Ok(Sim {
            config,
            params,
            network,
            play_matrix,
            state,
            schedule,
            seeder,
            transmission,
            rng,
            next_day: Day::ZERO,
            stopped: None,
            failed: false,
            #[cfg(feature = "parallel")]
            pool,
        })
    }
}

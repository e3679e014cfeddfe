//! life-pv CLI
//!
//! Command-line interface for present values, projections and block runs

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Instant;

use anyhow::{bail, Context, Result};
use clap::{Args, Parser, Subcommand};

use life_pv::contract::load_contracts;
use life_pv::finance::annuity_certain;
use life_pv::present_values::{
    deferred_temporary_annuity, deferred_whole_life_annuity, endowment, pure_endowment,
    temporary_annuity_k, term_insurance, whole_life_annuity_k,
};
use life_pv::tables::load_table;
use life_pv::{
    CommutationCache, Contract, MortalityTable, PaymentFrequency, ProjectionResult, Sex,
    ValuationRunner,
};

/// life-pv - actuarial present values for life-insurance contracts
#[derive(Parser, Debug)]
#[command(name = "life-pv")]
#[command(version, about, long_about = None)]
struct Cli {
    /// Mortality table file (Alter;qx;qy); defaults to the built-in IAM 2012 table
    #[arg(long, global = true)]
    table: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Scalar present values for one contract
    Value(ContractArgs),

    /// Present values and reserves for every policy year of one contract
    Project {
        #[command(flatten)]
        contract: ContractArgs,

        /// Write all rows to this CSV file
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Project a CSV block of contracts in parallel
    Block {
        /// Contract block (ContractID,EntryAge,Sex,InterestRate,Term,...)
        #[arg(short, long)]
        input: PathBuf,

        /// Output CSV with one row per contract and policy year
        #[arg(short, long, default_value = "block_output.csv")]
        output: PathBuf,
    },
}

/// Contract given either as a JSON file or as individual parameters
#[derive(Args, Debug)]
struct ContractArgs {
    /// Contract JSON file
    #[arg(long, conflicts_with_all = ["age", "sex", "rate", "term"])]
    contract: Option<PathBuf>,

    /// Entry age
    #[arg(long, required_unless_present = "contract")]
    age: Option<u32>,

    /// Sex (M or F)
    #[arg(long, required_unless_present = "contract")]
    sex: Option<String>,

    /// Annual technical interest rate, e.g. 0.0175
    #[arg(long, required_unless_present = "contract")]
    rate: Option<f64>,

    /// Contract term in years
    #[arg(long, required_unless_present = "contract")]
    term: Option<u32>,

    /// Premium payment term in years (defaults to the contract term)
    #[arg(long)]
    premium_term: Option<u32>,

    /// Payments per year (1, 2, 4 or 12)
    #[arg(short = 'k', long, default_value = "1")]
    frequency: u32,

    /// Deferment period for annuity values
    #[arg(long)]
    deferment: Option<u32>,
}

impl ContractArgs {
    fn to_contract(&self) -> Result<Contract> {
        if let Some(path) = &self.contract {
            return Contract::from_json_path(path)
                .with_context(|| format!("reading contract from {}", path.display()));
        }

        let (Some(age), Some(sex), Some(rate), Some(term)) =
            (self.age, self.sex.as_deref(), self.rate, self.term)
        else {
            bail!("--age, --sex, --rate and --term are required without --contract");
        };

        let sex: Sex = sex.parse()?;
        let mut contract = Contract::new(0, age, sex, rate, term)
            .with_frequency(PaymentFrequency::try_from(self.frequency)?);
        if let Some(premium_term) = self.premium_term {
            contract = contract.with_premium_term(premium_term);
        }
        if let Some(deferment) = self.deferment {
            contract = contract.with_deferment(deferment);
        }
        Ok(contract)
    }
}

fn main() -> Result<()> {
    env_logger::init();

    let cli = Cli::parse();
    let table = Arc::new(match &cli.table {
        Some(path) => load_table(path)
            .with_context(|| format!("loading mortality table {}", path.display()))?,
        None => MortalityTable::iam_2012_basic(),
    });

    match &cli.command {
        Commands::Value(args) => run_value(table, &args.to_contract()?),
        Commands::Project { contract, output } => {
            run_project(table, &contract.to_contract()?, output.as_deref())
        }
        Commands::Block { input, output } => run_block(table, input, output),
    }
}

fn run_value(table: Arc<MortalityTable>, contract: &Contract) -> Result<()> {
    contract.validate(&table)?;

    let (x, n, sex, i, k) = (
        contract.entry_age,
        contract.term,
        contract.sex,
        contract.interest_rate,
        contract.k(),
    );
    let t = contract.premium_term();

    println!("Table: {} (ages {}-{})", table.name(), table.min_age(), table.max_age());
    println!("Contract: age {}, sex {}, rate {}, term {}, premium term {}, k {}", x, sex, i, n, t, k);
    println!();

    let axk = whole_life_annuity_k(&table, x, sex, i, k);
    let axnk = temporary_annuity_k(&table, x, n, sex, i, k);
    let premium_annuity = temporary_annuity_k(&table, x, t, sex, i, k);
    let term = term_insurance(&table, x, n, sex, i);
    let endow = pure_endowment(&table, x, n, sex, i);
    let total = endowment(&table, x, n, sex, i);

    println!("Annuities");
    println!("  ä_x^(k)          {:>14.10}", axk);
    println!("  ä_x:n^(k)        {:>14.10}", axnk);
    println!("  ä_x:t^(k)        {:>14.10}", premium_annuity);
    if let Some(d) = contract.deferment {
        println!("  d|ä_x^(k)        {:>14.10}", deferred_whole_life_annuity(&table, x, d, sex, i, k));
        println!("  d|ä_x:n^(k)      {:>14.10}", deferred_temporary_annuity(&table, x, n, d, sex, i, k));
    }
    println!("  ä_n^(k) certain  {:>14.10}", annuity_certain(n, i, k));

    println!("Benefits");
    println!("  A^1_x:n          {:>14.10}", term);
    println!("  nE_x             {:>14.10}", endow);
    println!("  A_x:n            {:>14.10}", total);

    if premium_annuity > 0.0 {
        println!("Net premium rate   {:>14.10}", total / premium_annuity);
    }

    // Cross-check against commutation columns
    let mut cache = CommutationCache::new(Arc::clone(&table));
    let columns = cache.get(sex, i);
    let diffs = [
        (columns.whole_life_annuity(x, k) - axk).abs(),
        (columns.temporary_annuity(x, n, k) - axnk).abs(),
        (columns.term_insurance(x, n) - term).abs(),
        (columns.pure_endowment(x, n) - endow).abs(),
    ];
    let max_diff = diffs.iter().copied().fold(0.0, f64::max);
    println!();
    println!("Commutation check: max |difference| = {:.3e}", max_diff);

    Ok(())
}

fn run_project(table: Arc<MortalityTable>, contract: &Contract, output: Option<&Path>) -> Result<()> {
    contract.validate(&table)?;

    let runner = ValuationRunner::with_table(table);
    let result = runner.run(contract);
    print_projection(&result);

    if let Some(path) = output {
        write_rows(path, std::slice::from_ref(&result))?;
        println!("\nFull results written to: {}", path.display());
    }
    Ok(())
}

fn run_block(table: Arc<MortalityTable>, input: &Path, output: &Path) -> Result<()> {
    let contracts = load_contracts(input)
        .with_context(|| format!("loading contracts from {}", input.display()))?;

    for contract in &contracts {
        if let Err(e) = contract.validate(&table) {
            log::warn!("contract {}: {}", contract.contract_id, e);
        }
    }

    let runner = ValuationRunner::with_table(table);
    let start = Instant::now();
    let results = runner.run_batch(&contracts);
    println!("Projected {} contracts in {:?}", results.len(), start.elapsed());

    let empty = results.iter().filter(|r| r.is_empty()).count();
    if empty > 0 {
        println!("  {} contracts could not be projected (see log)", empty);
    }

    write_rows(output, &results)?;
    println!("Results written to: {}", output.display());
    Ok(())
}

fn print_projection(result: &ProjectionResult) {
    println!(
        "{:>4} {:>4} {:>4} {:>14} {:>14} {:>14} {:>14} {:>14}",
        "m", "Age", "Rem", "Annuity", "DeathBen", "PureEnd", "Endowment", "Reserve"
    );
    println!("{}", "-".repeat(92));
    for row in &result.rows {
        println!(
            "{:>4} {:>4} {:>4} {:>14.10} {:>14.10} {:>14.10} {:>14.10} {:>14.10}",
            row.offset,
            row.attained_age,
            row.remaining_term,
            row.premium_annuity,
            row.death_benefit,
            row.pure_endowment,
            row.endowment,
            row.reserve,
        );
    }

    let summary = result.summary();
    println!("\nSummary:");
    println!("  Years: {}", summary.total_years);
    println!("  Net Premium: {:.10}", summary.net_premium);
    println!("  Max Reserve: {:.10}", summary.max_reserve);
    println!("  Reserve at Maturity: {:.10}", summary.reserve_at_maturity);
}

fn write_rows(path: &Path, results: &[ProjectionResult]) -> Result<()> {
    let mut writer = csv::Writer::from_path(path)
        .with_context(|| format!("creating {}", path.display()))?;
    for result in results {
        for row in &result.rows {
            writer.serialize(row)?;
        }
    }
    writer.flush()?;
    Ok(())
}

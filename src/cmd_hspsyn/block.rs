use anyhow::Context;
use clap::*;
use tracing::info;

use hspsyn::libs::block::{write_blocks, Order};
use hspsyn::libs::fetch::GenomeStore;
use hspsyn::libs::pipeline::{run, BlockOpts};
use hspsyn::libs::sub_matrix::SubMatrix;

// Create clap subcommand arguments
pub fn make_subcommand() -> Command {
    Command::new("block")
        .about("Rescore HSPs, remove redundant ones and group the rest into synteny blocks")
        .after_help(
            r###"
Input lines are tab-separated:

    query  program  feature  q_start  q_end  target  t_start  t_end  score  pvalue
    [q_strand  t_strand  identity  positive  cigar]

* `query` and `target` are region specs like `S288c.I:1001-2000`; local
  coordinates are 1-based and relative to the region start
* Lines with fewer than 10 fields, or a query span below --min-len, are skipped
* Every HSP is rescored in six reading frames; non-positive scores are dropped
* Overlapping HSPs on one chromosome pair are removed greedily,
  first along the target, then along the query
* Neighbours within --distance on both axes share a block

Output:

    ordinal(block)  species1  chr1  program  feature  q_start  q_end  q_strand
    species2  chr2  t_start  t_end  t_strand  score  identity%  positive  cigar

Examples:
1. Default settings:
   hspsyn block hits.tsv -g query.fa target.fa

2. BLOSUM62 scoring, blocks ordered by query:
   hspsyn block hits.tsv -g genomes.fa.gz --matrix blosum62 --query-first

"###,
        )
        .arg(
            Arg::new("infile")
                .index(1)
                .num_args(1)
                .default_value("stdin")
                .help("Input HSP file. [stdin] for standard input"),
        )
        .arg(
            Arg::new("genome")
                .long("genome")
                .short('g')
                .num_args(1..)
                .required(true)
                .help("Genome files holding both sides, FASTA (.fa, .fa.gz) or .2bit"),
        )
        .arg(
            Arg::new("distance")
                .long("distance")
                .short('d')
                .num_args(1)
                .default_value("50000")
                .value_parser(value_parser!(i64))
                .help("Maximum gap between neighbours of one block"),
        )
        .arg(
            Arg::new("query_first")
                .long("query-first")
                .action(ArgAction::SetTrue)
                .help("Order blocks by query chromosome and position"),
        )
        .arg(
            Arg::new("matrix")
                .long("matrix")
                .num_args(1)
                .help("Substitution matrix, `blosum62` or a file. Match/mismatch 2/-1 if absent"),
        )
        .arg(
            Arg::new("min_len")
                .long("min-len")
                .num_args(1)
                .default_value("15")
                .value_parser(value_parser!(usize))
                .help("Minimum query span of an HSP"),
        )
        .arg(
            Arg::new("query_name")
                .long("query-name")
                .num_args(1)
                .default_value("query")
                .help("Species label when the query spec has none"),
        )
        .arg(
            Arg::new("target_name")
                .long("target-name")
                .num_args(1)
                .default_value("target")
                .help("Species label when the target spec has none"),
        )
        .arg(
            Arg::new("outfile")
                .long("outfile")
                .short('o')
                .num_args(1)
                .default_value("stdout")
                .help("Output filename. [stdout] for screen"),
        )
}

// command implementation
pub fn execute(args: &ArgMatches) -> anyhow::Result<()> {
    //----------------------------
    // Args
    //----------------------------
    let infile = args.get_one::<String>("infile").unwrap();
    let mut writer = intspan::writer(args.get_one::<String>("outfile").unwrap());

    let matrix = match args.get_one::<String>("matrix") {
        Some(name) => Some(
            SubMatrix::from_name(name).with_context(|| format!("loading matrix {}", name))?,
        ),
        None => None,
    };

    let opts = BlockOpts {
        distance: *args.get_one::<i64>("distance").unwrap(),
        order: if args.get_flag("query_first") {
            Order::QueryFirst
        } else {
            Order::TargetFirst
        },
        matrix: matrix.as_ref(),
        min_len: *args.get_one::<usize>("min_len").unwrap(),
    };
    let query_name = args.get_one::<String>("query_name").unwrap();
    let target_name = args.get_one::<String>("target_name").unwrap();

    //----------------------------
    // Load
    //----------------------------
    let mut store = GenomeStore::new();
    for genome in args.get_many::<String>("genome").unwrap() {
        let n = store
            .load(genome)
            .with_context(|| format!("reading {}", genome))?;
        info!("{} sequences from {}", n, genome);
    }

    //----------------------------
    // Process
    //----------------------------
    let reader = intspan::reader(infile);
    let (numbered, stats) = run(reader, &mut store, &opts)?;

    //----------------------------
    // Output
    //----------------------------
    write_blocks(&mut writer, &numbered, query_name, target_name)?;
    stats.log();

    Ok(())
}

use anyhow::Context;
use clap::*;
use std::io::Write;

use hspsyn::libs::frame::{frame_peptides, score_pair};
use hspsyn::libs::sub_matrix::SubMatrix;

// Create clap subcommand arguments
pub fn make_subcommand() -> Command {
    Command::new("score")
        .about("Score two aligned nucleotide sequences in six frames")
        .after_help(
            r###"
Both sequences are translated in three forward and three reverse-complement
frames. The best frame is reported; ties go to the lower frame.

Output, tab-separated:

    score  identity  frame  strand
    peptide1
    peptide2

Frames 0-2 are forward offsets, 3-5 the same offsets on the reverse complement.

Examples:
1. hspsyn score ATGGCCAAA ATGGCTAAA
2. hspsyn score ATGGCCAAA ATGGCTAAA --matrix blosum62

"###,
        )
        .arg(
            Arg::new("seq1")
                .required(true)
                .index(1)
                .num_args(1)
                .help("First nucleotide sequence"),
        )
        .arg(
            Arg::new("seq2")
                .required(true)
                .index(2)
                .num_args(1)
                .help("Second nucleotide sequence"),
        )
        .arg(
            Arg::new("matrix")
                .long("matrix")
                .num_args(1)
                .help("Substitution matrix, `blosum62` or a file. Match/mismatch 2/-1 if absent"),
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
    let seq1 = args.get_one::<String>("seq1").unwrap().as_bytes();
    let seq2 = args.get_one::<String>("seq2").unwrap().as_bytes();
    let mut writer = intspan::writer(args.get_one::<String>("outfile").unwrap());

    let matrix = match args.get_one::<String>("matrix") {
        Some(name) => Some(
            SubMatrix::from_name(name).with_context(|| format!("loading matrix {}", name))?,
        ),
        None => None,
    };

    let fs = score_pair(seq1, seq2, matrix.as_ref())?;
    let (pep1, pep2) = frame_peptides(seq1, seq2, fs.frame);

    writer.write_fmt(format_args!(
        "{}\t{}\t{}\t{}\n",
        fs.score,
        fs.identity,
        fs.frame,
        if fs.is_reverse() { "-" } else { "+" }
    ))?;
    writer.write_fmt(format_args!("{}\n", String::from_utf8_lossy(&pep1)))?;
    writer.write_fmt(format_args!("{}\n", String::from_utf8_lossy(&pep2)))?;

    Ok(())
}

mod common;

use common::{legacy_genome_doc, StubAssemblies, StubSequences, StubTaxa};
use genofile::bio::genome::Genome;
use genofile::core::Migrator;
use genofile::export::{
    FastaParams, FeatureFastaExporter, GenbankWriter, GffDialect, GffWriter,
};
use pretty_assertions::assert_eq;

fn migrated_genome() -> Genome {
    Migrator::new(&StubTaxa, &StubAssemblies)
        .migrate(legacy_genome_doc())
        .unwrap()
}

#[test]
fn gff3_walks_the_feature_graph_in_order() {
    let genome = migrated_genome();
    let mut buf = Vec::new();
    GffWriter::new(&genome, GffDialect::Gff3)
        .write(&mut buf)
        .unwrap();
    let output = String::from_utf8(buf).unwrap();
    let lines: Vec<&str> = output.lines().collect();

    assert_eq!(lines[0], "##sequence-region c1");
    assert!(lines[1].starts_with("c1\tKBase\tgene\t100\t399\t.\t+\t0\tID=g1"));
    assert!(lines[2].starts_with("c1\tKBase\tCDS\t100\t399\t.\t+\t0\tID=cds1; Parent=g1"));
    // orphan mRNA sorts after the gene at the same start, then its exon
    assert!(lines[3].starts_with("c1\tKBase\tmRNA\t100\t399"));
    assert!(lines[4].starts_with("c1\tKBase\texon\t100\t399\t.\t+\t0\tID=m1_exon_1; Parent=m1"));
    // reverse-strand non-coding gene comes last, coordinates normalized
    assert!(lines[5].starts_with("c1\tKBase\tgene\t821\t900\t.\t-\t0\tID=nc_gene"));
}

#[test]
fn gff3_attributes_carry_annotations() {
    let genome = migrated_genome();
    let mut buf = Vec::new();
    GffWriter::new(&genome, GffDialect::Gff3)
        .write(&mut buf)
        .unwrap();
    let output = String::from_utf8(buf).unwrap();
    let gene_line = output
        .lines()
        .find(|l| l.contains("ID=g1"))
        .expect("gene line present");
    assert!(gene_line.contains("gene_synonym=gyrB"));
    assert!(gene_line.contains("product=DNA gyrase subunit B%3BATPase"));
    assert!(gene_line.contains("go=GO:0003918"));
}

#[test]
fn gtf_cds_without_mrna_uses_its_own_id_as_transcript() {
    let genome = migrated_genome();
    let mut buf = Vec::new();
    GffWriter::new(&genome, GffDialect::Gtf)
        .write(&mut buf)
        .unwrap();
    let output = String::from_utf8(buf).unwrap();
    let cds_line = output
        .lines()
        .find(|l| l.contains("\tCDS\t"))
        .expect("CDS line present");
    assert!(cds_line.ends_with(r#"gene_id "g1"; transcript_id "cds1""#));
}

#[test]
fn genbank_records_embed_sequence_and_features() {
    let genome = migrated_genome();
    let mut buf = Vec::new();
    GenbankWriter::new(&genome, &StubSequences)
        .write(&mut buf)
        .unwrap();
    let output = String::from_utf8(buf).unwrap();

    assert!(output.starts_with("LOCUS"));
    assert!(output.contains("SOURCE      KBase_RefSeq"));
    assert!(output.contains("  ORGANISM  Escherichia coli"));
    assert!(output.contains("Bacteria; Escherichia coli"));
    assert!(output.contains("gene            100..399"));
    assert!(output.contains("CDS             100..399"));
    assert!(output.contains("complement(821..900)"));
    assert!(output.contains("/locus_tag=\"g1\""));
    assert!(output.contains("/translation=\"MKT\""));
    assert!(output.contains("ORIGIN"));
}

#[test]
fn genbank_file_round_trips_through_a_file() {
    let genome = migrated_genome();
    let file = tempfile::NamedTempFile::new().unwrap();
    {
        let mut out = std::io::BufWriter::new(file.reopen().unwrap());
        GenbankWriter::new(&genome, &StubSequences)
            .write(&mut out)
            .unwrap();
    }
    let contents = std::fs::read_to_string(file.path()).unwrap();
    assert!(contents.contains("LOCUS"));
    assert!(contents.ends_with("//\n"));
}

#[test]
fn protein_fasta_exports_cds_translations() {
    let genome = migrated_genome();
    let exporter = FeatureFastaExporter::new(&genome, FastaParams::default());
    let mut buf = Vec::new();
    exporter.write_protein(&mut buf).unwrap();
    assert_eq!(String::from_utf8(buf).unwrap(), ">cds1\nMKT\n");
}

#[test]
fn nucleotide_fasta_skips_features_without_sequence() {
    let genome = migrated_genome();
    let params = FastaParams {
        feature_lists: vec!["features".to_string(), "non_coding_features".to_string()],
        ..Default::default()
    };
    let exporter = FeatureFastaExporter::new(&genome, params);
    let mut buf = Vec::new();
    exporter.write_nucleotide(&mut buf).unwrap();
    // no feature in the fixture carries dna_sequence
    assert!(buf.is_empty());
}

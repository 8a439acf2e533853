// src/config/defaults.rs

/// Listing scraped when no `base_url` is configured.
pub const BASE_URL: &str = "https://anaconda.org/bioconda/repo";

pub const OUTPUT_FILE: &str = "bioconda_filtered_packages.tsv";

pub const TIMEOUT_SECS: u64 = 30;
pub const MAX_RETRIES: u32 = 5;
pub const BACKOFF_FACTOR: f64 = 1.0;
pub const PAGE_DELAY_SECS: u64 = 5;

/// Rows last updated in one of these years are considered stale.
pub const CUTOFF_LABELS: &[&str] = &["2017", "2018", "2019"];

pub const INCLUSION_TERMS: &[&str] = &[
    "phylo", "k-mer", "populat", "metagen", "antimicrob", "antibio", "resistance",
    "ortholog", "paralog", "Bayesian", "trim", "read", "mapp", "CARD", "AMR", "Illumina",
    "Solexa", "assembl", "synten", "HGT", "plasmid", "cluster", "MAG", "annotat", "refin",
    "genom", "coding", "script", "taxon", "sequenc", "motif", "KEGG", "COG", "evolution",
    "model", "R", "pangenom", "pipeline", "Nextflow", "Snakemake", "alignment", "graph",
    "tensor", "informat", "algorithm", "geograph", "SV", "structural variant", "phage",
    "vir", "bootstrap", "statist", "infer", "pathogen", "strain", "infect", "variant",
    "non-coding", "correct", "quality", "transpos", "mobile gen", "HMM", "Hidden Markov",
    "gene transfer", "translat", "contam", "compar", "GO term", "marker", "identif",
    "benchmark", "cross-validat", "core", "dynamic", "best", "targeted", "accurat", "AU",
    "calling", "reproducib", "epidem", "coverage", "resolution", "quantif", "parallel",
    "GPU", "loop", "GATK", "entropy", "indices", "flanking", "slurm",
];

pub const EXCLUSION_TERMS: &[&str] = &[
    // sequencing platforms and assay types
    "RNA-seq", "Nanopore", "PacBio", "single-cell", "long-read", "ONT", "-seq", "amplicon",
    "ChIP", "SingleCell", "16S", "18S", "single cell", "Hi-C", "PCR", "polymerase",
    "circRNA", "small RNA", "primer", "MinION", "Cytomet", "third gen", "MS/MS", "LC/MS",
    "-MS", "MS", "NMR", "qPCR", "CLIP", "Pore-C", "ChIA", "WBGS", "10X", "microarray",
    "Micro Array", "Blot", "Gel", "Electrophore", "FACS", "Qubit", "Elut", "beads",
    "Bisulfite", "bisulfute", "spectro", "isotop", "mass",
    // organisms and tissues
    "mitochondr", "plastid", "plast", "organel", "organ", "tumor", "cancer", "leukemia",
    "mouse", "mice", "musculus", "thaliana", "Arabidopsis", "zebrafish", "rerio", "elegans",
    "Caeno", "chicken", "Gallus", "gallopovo", "yeast", "Candida", "plant", "Zea",
    "Drosophila", "melanogaster", "scrofa", "Xenopus", "purpuratus", "taurus", "Anopheles",
    "Rattus", "Pongo", "japonicus", "domestica", "Bombyx", "Bacillus", "pneumophila",
    "Influenza", "SARS", "plankton", "filamentous", "human", "sapiens", "fetal",
    "fibroblasts", "Epithelial", "Mesenchymal", "Brain", "neuro", "neural", "tissue",
    "cell-culture", "cell-line", "Cell-Lines", "cell-cycle", "cell cycle", "cellular",
    "cell-type", "T cell", "B cell", "cytes", "cytol", "Cyto", "soma", "mtDNA", "ancient",
    // expression, regulation and other omics
    "expression", "DESeq", "DEG", "Differential", "transcriptom", "transcrip",
    "Transcription", "transcription factor", "post-transcription", "post-translation",
    "Translation", "splicing", "exon", "intron", "Isoform", "isoform", "TxDb", "promoter",
    "regulator", "Regulat", "regulon", "Regulon", "Enrichment", "enrichment", "GSEA",
    "QSEA", "Pathway", "reactome", "interactome", "protein-protein", "Proteom", "peptid",
    "metabol", "lipid", "methyl", "Methyl", "methylation", "epigen", "chrom", "nucleosome",
    "nuclear", "lncRNA", "RNA", "ribo", "Multi-Omics", "meta-omic", "HLA", "immun",
    "antibody", "V(D)J", "GWAS", "ploidy", "diploid", "homozyg", "epista", "polymorphic",
    "CRISPR", "gene editing", "genome editing", "oligomer", "Oligomer", "acylation",
    "zyme", "ase", "Ligand", "binding", "dock", "folding", "structur", "pharmaco",
    "chemi", "pigment", "Fluor", "fluor", "intensit", "barcod", "probes", "Assay", "assay",
    "assays", "arrays", "Affy", "cloning", "Sanger", "survival", "cohort", "sex", "Gender",
    "social", "disorder", "invasive", "extracellular", "tandem", "oma", "1000 Genomes",
    "mlst", "Mlst", "cgMLST",
    // tooling that is not analysis
    "format", "convert", "server", "client", "GALAXY", "Windows", "photo", "images",
    "image process", "Medical image", "Browser", "web", "web-base", "HTTP", "HTML", "url",
    "FTP", "API", "cloud", "AWS", "Redis", "engine", "GUI", "interface", "interactive",
    "Wrapper", "wrapper", "utility", "utilities", "Utilities", "helper", "library",
    "module", "modules", "import", "Excel", "YAML", "yaml", "FASTA", "FASTQ", "VCF", "vcf",
    "2bit", "compression", "Storage", "repositor", "zenodo", "Dryad", "Submission",
    "submission", "NCBI", "GenBank", "Ensembl", "UCSC", "DDBJ", "DBBJ", "accession",
    "genome database", "ATLAS", "data package", "Example", "example", "tutorial",
    "Design Info", "Timer", "IDE", "Access", "Lite", "string", "date", "Delayed",
    "No Summary", "paper", "language", "pars", "writ", "::", "add", "net", "OS", "Nxt",
    "Falcon", "to MeSH", "Digital", "crypto", "physical", "resource consumption",
    "building", "convenien", "implementation",
    // out of interest
    "long", "long read", "hybrid", "polishing", "Polishing", "growth-rate", "learning",
    "supervised", "unsupervised", "Semi-Supervised", "Unsupervised", "Supervised", "AI",
    "intelligen", "Biobb", "biob", "endogenous", "Genomics", "genomics", "CAZ", "Center",
    "ITS",
];

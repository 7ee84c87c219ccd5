use abgraft::core::germlines::registry::GermlineSet;
use abgraft::core::models::chain::{ChainType, NumberedChain};
use abgraft::core::models::scheme::{CdrDefinition, Scheme};
use abgraft::core::numbering::engine::{AnchorNumberer, Numberer};
use abgraft::core::numbering::error::NumberingError;
use abgraft::core::regions::map::CdrDefinitionMap;
use abgraft::engine::assemble::HumanizationResult;
use abgraft::engine::config::{GermlineChoice, HumanizationParams, HumanizationParamsBuilder};
use abgraft::engine::error::{ChainRole, HumanizationError, Stage};
use abgraft::engine::graft::ResidueSource;
use abgraft::engine::locate;
use abgraft::engine::progress::ProgressReporter;
use abgraft::engine::refine::{OracleError, RefinementOracle};
use abgraft::workflows::humanize::Humanizer;
use std::sync::atomic::{AtomicUsize, Ordering};

const HEAVY: &str = "QVQLVESGGGLVQPGGSLRLSCAASGFTFSSYAMSWVRQAPGKGLEWVSAISGSGGSTYYADSVKGRFTISRDNSKNTLYLQMNSLRAEDTAVYYCAKDRLSITIRPRYYGMDVWGQGTTVTVSS";
const MOUSE_LIKE_HEAVY: &str = "QIQLVESGGGLVQPGGSLRLSCAASGFTFSSYAMSWVRQAPGKGLEWISAISGSGGSTYYADSVKGRFTISLDNSKNTLYLQMNSLRAEDTAVYYCAKDRLSITIRPRYYGMDVWGQGTTVTVSS";
const KAPPA: &str = "DIQMTQSPSSLSASVGDRVTITCRASQSISSYLNWYQQKPGKAPKLLIYAASSLQSGVPSRFSGSGSGTDFTLTISSLQPEDFATYYCQQSYSTPLTFGQGTKVEIK";

fn germlines() -> GermlineSet {
    GermlineSet::builtin(&AnchorNumberer).unwrap()
}

fn kabat() -> HumanizationParamsBuilder {
    HumanizationParamsBuilder::new()
        .scheme(Scheme::Kabat)
        .cdr_definition(CdrDefinition::Kabat)
}

fn run(
    set: &GermlineSet,
    params: HumanizationParams,
    heavy: Option<&str>,
    light: Option<&str>,
) -> HumanizationResult {
    Humanizer::new(set, &AnchorNumberer, params, None)
        .unwrap()
        .humanize(heavy, light, &ProgressReporter::new())
        .unwrap()
}

#[test]
fn kabat_heavy_scenario_grafts_cdrs_onto_ighv3_23() {
    let set = germlines();
    let result = run(&set, kabat().build().unwrap(), Some(HEAVY), None);

    let heavy = result.heavy.as_ref().unwrap();
    assert!(result.light.is_none());
    assert_eq!(heavy.v_germline, "IGHV3-23*01");
    assert_eq!(heavy.j_germline.as_deref(), Some("IGHJ6*02"));
    assert!(heavy.sequence.starts_with("EVQLLESGG"));
    assert_eq!(
        heavy.sequence,
        "EVQLLESGGGLVQPGGSLRLSCAASGFTFSSYAMSWVRQAPGKGLEWVSAISGSGGSTYYADSVKGRFTISRDNSKNTLYLQMNSLRAEDTAVYYCAKDRLSITIRPRYYGMDVWGQGTTVTVSS"
    );
    for cdr in ["SYAMS", "AISGSGGSTYYADSVKG", "DRLSITIRPRYYGMDV"] {
        assert!(heavy.sequence.contains(cdr), "missing CDR {cdr}");
    }
    assert!(heavy.warnings.is_empty());
    assert_eq!(
        heavy.fasta_description("mAb1", &result.provenance),
        "mAb1 VH (Humanized mAb1 CDR_Grafted_kabat_IGHV3-23*01)"
    );
}

#[test]
fn humanization_is_deterministic() {
    let set = germlines();
    let params = kabat().backmutate_vernier(true).build().unwrap();
    let first = run(&set, params.clone(), Some(HEAVY), Some(KAPPA));
    let second = run(&set, params, Some(HEAVY), Some(KAPPA));
    assert_eq!(first, second);
}

#[test]
fn cdr_residues_are_preserved() {
    let set = germlines();
    for (scheme, definition) in [
        (Scheme::Kabat, CdrDefinition::Kabat),
        (Scheme::Chothia, CdrDefinition::North),
        (Scheme::Imgt, CdrDefinition::Imgt),
    ] {
        let params = HumanizationParamsBuilder::new()
            .scheme(scheme)
            .cdr_definition(definition)
            .build()
            .unwrap();
        let result = run(&set, params, Some(HEAVY), Some(KAPPA));
        for (input, chain) in [(HEAVY, &result.heavy), (KAPPA, &result.light)] {
            let chain = chain.as_ref().unwrap();
            let numbered = AnchorNumberer.number(input, scheme).unwrap();
            let location = locate::locate(&numbered, definition).unwrap();
            for position in &location.cdr_positions {
                let entry = chain
                    .positions
                    .iter()
                    .find(|e| e.position == *position)
                    .unwrap();
                assert_eq!(entry.residue, numbered.get(*position));
                assert_eq!(entry.source, ResidueSource::InputCdr);
            }
        }
    }
}

#[test]
fn framework_residues_come_from_the_germline() {
    let set = germlines();
    let result = run(&set, kabat().build().unwrap(), Some(HEAVY), Some(KAPPA));
    let map = CdrDefinitionMap::lookup(Scheme::Kabat, CdrDefinition::Kabat, ChainType::Kappa).unwrap();
    let light = result.light.as_ref().unwrap();
    for entry in &light.positions {
        if map.is_framework(entry.position) && entry.germline.is_some() {
            assert_eq!(entry.source, ResidueSource::Germline);
            assert_eq!(entry.residue, entry.germline);
        }
    }
}

#[test]
fn vernier_backmutation_only_touches_vernier_positions() {
    let set = germlines();
    let template = |builder: HumanizationParamsBuilder| {
        builder
            .heavy_v_germline(GermlineChoice::Explicit("IGHV3-23*01".to_string()))
            .heavy_j_germline(GermlineChoice::Explicit("IGHJ6*02".to_string()))
            .build()
            .unwrap()
    };
    let plain = run(&set, template(kabat()), Some(MOUSE_LIKE_HEAVY), None);
    let vernier = run(
        &set,
        template(kabat().backmutate_vernier(true)),
        Some(MOUSE_LIKE_HEAVY),
        None,
    );

    let map = CdrDefinitionMap::lookup(Scheme::Kabat, CdrDefinition::Kabat, ChainType::Heavy).unwrap();
    let zone: Vec<_> = map.vernier_positions().collect();
    let before = &plain.heavy.as_ref().unwrap().positions;
    let after = &vernier.heavy.as_ref().unwrap().positions;
    assert_eq!(before.len(), after.len());

    let mut changed = Vec::new();
    for (b, a) in before.iter().zip(after) {
        assert_eq!(b.position, a.position);
        if b.residue != a.residue {
            assert!(zone.contains(&a.position), "{} is not a Vernier position", a.position);
            assert_eq!(a.residue, a.original);
            changed.push(a.position.to_string());
        }
    }
    assert_eq!(changed, vec!["2", "48", "71"]);
    assert_eq!(vernier.provenance.export_name(), "CDR_Grafted_kabat_Vernier_");
}

#[test]
fn identity_ties_pick_the_smallest_identifier() {
    // Identical V and J genes listed with the larger identifier first.
    let v = "EVQLLESGGGLVQPGGSLRLSCAASGFTFSSYAMSWVRQAPGKGLEWVSAISGSGGSTYYADSVKGRFTISRDNSKNTLYLQMNSLRAEDTAVYYCAK";
    let j = "YYYYYGMDVWGQGTTVTVSS";
    let toml = format!(
        r#"
[[germline]]
id = "IGHV-ZZ*01"
chain = "heavy"
segment = "V"
sequence = "{v}"

[[germline]]
id = "IGHJ-ZZ*01"
chain = "heavy"
segment = "J"
sequence = "{j}"

[[germline]]
id = "IGHV-AA*01"
chain = "heavy"
segment = "V"
sequence = "{v}"

[[germline]]
id = "IGHJ-AA*01"
chain = "heavy"
segment = "J"
sequence = "{j}"
"#
    );
    let set = GermlineSet::parse(&toml, &AnchorNumberer).unwrap();

    for (scheme, definition) in [
        (Scheme::Kabat, CdrDefinition::Kabat),
        (Scheme::Imgt, CdrDefinition::Imgt),
    ] {
        let params = HumanizationParamsBuilder::new()
            .scheme(scheme)
            .cdr_definition(definition)
            .build()
            .unwrap();
        let heavy = run(&set, params, Some(MOUSE_LIKE_HEAVY), None).heavy.unwrap();
        assert_eq!(heavy.v_germline, "IGHV-AA*01");
        assert_eq!(heavy.j_germline.as_deref(), Some("IGHJ-AA*01"));
    }
}

#[test]
fn builtin_identity_tie_under_imgt_picks_ighv3_23() {
    // IGHV3-23*01 and IGHV3-66*01 score the same IMGT framework identity here.
    let set = germlines();
    let params = HumanizationParamsBuilder::new()
        .scheme(Scheme::Imgt)
        .cdr_definition(CdrDefinition::Imgt)
        .build()
        .unwrap();
    let result = run(&set, params, Some(HEAVY), None);
    assert_eq!(result.heavy.unwrap().v_germline, "IGHV3-23*01");
}

#[test]
fn zero_iterations_never_call_the_oracle() {
    let set = germlines();
    let calls = AtomicUsize::new(0);
    let oracle = |seq: &str| -> Result<String, OracleError> {
        calls.fetch_add(1, Ordering::SeqCst);
        Ok(seq.to_string())
    };
    let with_oracle = Humanizer::new(
        &set,
        &AnchorNumberer,
        kabat().build().unwrap(),
        Some(&oracle as &dyn RefinementOracle),
    )
    .unwrap()
    .humanize(Some(HEAVY), None, &ProgressReporter::new())
    .unwrap();
    let without = run(&set, kabat().build().unwrap(), Some(HEAVY), None);

    assert_eq!(calls.load(Ordering::SeqCst), 0);
    assert_eq!(with_oracle, without);
}

#[test]
fn oracle_failure_names_the_iteration() {
    let set = germlines();
    let calls = AtomicUsize::new(0);
    let oracle = |seq: &str| -> Result<String, OracleError> {
        if calls.fetch_add(1, Ordering::SeqCst) == 1 {
            Err("model unavailable".into())
        } else {
            Ok(seq.to_string())
        }
    };
    let params = kabat().refinement_iterations(3).build().unwrap();
    let err = Humanizer::new(&set, &AnchorNumberer, params, Some(&oracle as &dyn RefinementOracle))
        .unwrap()
        .humanize(Some(HEAVY), None, &ProgressReporter::new())
        .unwrap_err();

    assert_eq!(err.role, Some(ChainRole::Heavy));
    assert_eq!(err.stage, Stage::Refinement);
    assert_eq!(
        err.source,
        HumanizationError::Refinement {
            iteration: 2,
            reason: "model unavailable".to_string(),
        }
    );
}

#[test]
fn heavy_only_and_light_only_inputs() {
    let set = germlines();
    let heavy_only = run(&set, kabat().build().unwrap(), Some(HEAVY), None);
    assert!(heavy_only.heavy.is_some() && heavy_only.light.is_none());

    let light_only = run(&set, kabat().build().unwrap(), None, Some(KAPPA));
    let light = light_only.light.as_ref().unwrap();
    assert!(light_only.heavy.is_none());
    assert_eq!(light.chain_type, ChainType::Kappa);
    assert_eq!(light.v_germline, "IGKV1-39*01");
    assert_eq!(light_only.chains().count(), 1);
}

#[test]
fn unsupported_pair_fails_before_any_chain_is_processed() {
    let set = germlines();
    let numbered = AtomicUsize::new(0);

    struct CountingNumberer<'a>(&'a AtomicUsize);
    impl Numberer for CountingNumberer<'_> {
        fn number(&self, sequence: &str, scheme: Scheme) -> Result<NumberedChain, NumberingError> {
            self.0.fetch_add(1, Ordering::SeqCst);
            AnchorNumberer.number(sequence, scheme)
        }
    }

    let numberer = CountingNumberer(&numbered);
    let params = HumanizationParamsBuilder::new()
        .scheme(Scheme::Aho)
        .cdr_definition(CdrDefinition::Kabat)
        .build()
        .unwrap();
    let err = Humanizer::new(&set, &numberer, params, None).err().unwrap();
    assert_eq!(err.stage, Stage::Configuration);
    assert_eq!(
        err.source,
        HumanizationError::UnsupportedDefinition {
            scheme: Scheme::Aho,
            definition: CdrDefinition::Kabat,
        }
    );
    assert_eq!(numbered.load(Ordering::SeqCst), 0);
}

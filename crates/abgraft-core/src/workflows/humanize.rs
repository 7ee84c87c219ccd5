use crate::core::germlines::record::{GeneSegment, GermlineTemplate};
use crate::core::germlines::registry::GermlineSet;
use crate::core::numbering::engine::Numberer;
use crate::core::numbering::error::NumberingError;
use crate::core::regions::map::CdrDefinitionMap;
use crate::engine::assemble::{self, HumanizationResult, Provenance};
use crate::engine::config::{ChainGermlines, GermlineChoice, HumanizationParams};
use crate::engine::error::{ChainRole, HumanizationError, PipelineError, Stage};
use crate::engine::graft::{self, GraftPlan};
use crate::engine::locate;
use crate::engine::progress::{Progress, ProgressReporter};
use crate::engine::refine::{self, RefinementOracle};
use crate::engine::selection;
use crate::engine::vernier;
use tracing::{info, instrument};

/// A validated humanization run over a fixed reference set and configuration.
///
/// Construction checks everything that does not depend on the input
/// sequences, so a `Humanizer` can be shared across a batch of antibodies.
pub struct Humanizer<'a> {
    germlines: &'a GermlineSet,
    numberer: &'a dyn Numberer,
    params: HumanizationParams,
    oracle: Option<&'a dyn RefinementOracle>,
}

impl<'a> Humanizer<'a> {
    pub fn new(
        germlines: &'a GermlineSet,
        numberer: &'a dyn Numberer,
        params: HumanizationParams,
        oracle: Option<&'a dyn RefinementOracle>,
    ) -> Result<Self, PipelineError> {
        let configuration = |role, e: HumanizationError| PipelineError::new(role, Stage::Configuration, e);

        if !CdrDefinitionMap::is_supported(params.scheme, params.cdr_definition) {
            return Err(configuration(
                None,
                HumanizationError::UnsupportedDefinition {
                    scheme: params.scheme,
                    definition: params.cdr_definition,
                },
            ));
        }
        if params.refinement_iterations > 0 && oracle.is_none() {
            return Err(configuration(
                None,
                HumanizationError::MissingOracle {
                    iterations: params.refinement_iterations,
                },
            ));
        }
        for (role, choices) in [
            (ChainRole::Heavy, &params.heavy_germlines),
            (ChainRole::Light, &params.light_germlines),
        ] {
            validate_choices(germlines, role, choices)
                .map_err(|e| configuration(Some(role), e))?;
        }

        Ok(Self {
            germlines,
            numberer,
            params,
            oracle,
        })
    }

    pub fn params(&self) -> &HumanizationParams {
        &self.params
    }

    pub fn provenance(&self) -> Provenance {
        Provenance {
            scheme: self.params.scheme,
            cdr_definition: self.params.cdr_definition,
            vernier_backmutation: self.params.backmutate_vernier,
            refinement_iterations: self.params.refinement_iterations,
        }
    }

    /// Numbers `sequence` only to decide whether it is a heavy or light chain.
    pub fn detect_role(&self, sequence: &str) -> Result<ChainRole, PipelineError> {
        let chain = self
            .numberer
            .number(sequence, self.params.scheme)
            .map_err(|e| PipelineError::new(None, Stage::Numbering, e))?;
        Ok(ChainRole::of(chain.chain_type()))
    }

    /// Humanizes one antibody. Either chain may be absent, but not both.
    #[instrument(skip_all, name = "humanization_workflow")]
    pub fn humanize(
        &self,
        heavy: Option<&str>,
        light: Option<&str>,
        reporter: &ProgressReporter,
    ) -> Result<HumanizationResult, PipelineError> {
        if heavy.is_none() && light.is_none() {
            return Err(PipelineError::new(
                None,
                Stage::Assembly,
                HumanizationError::EmptyInput,
            ));
        }
        info!(
            scheme = %self.params.scheme,
            cdr_definition = %self.params.cdr_definition,
            vernier = self.params.backmutate_vernier,
            iterations = self.params.refinement_iterations,
            "Starting humanization."
        );

        // === Phase 1: Heavy chain ===
        let heavy_plan = heavy
            .map(|seq| {
                reporter.phase("Heavy chain", || {
                    self.humanize_chain(seq, ChainRole::Heavy, reporter)
                })
            })
            .transpose()?;

        // === Phase 2: Light chain ===
        let light_plan = light
            .map(|seq| {
                reporter.phase("Light chain", || {
                    self.humanize_chain(seq, ChainRole::Light, reporter)
                })
            })
            .transpose()?;

        // === Phase 3: Assembly ===
        let result = reporter.phase("Assembly", || {
            assemble::assemble(heavy_plan.as_ref(), light_plan.as_ref(), self.provenance())
                .map_err(|e| PipelineError::new(None, Stage::Assembly, e))
        })?;

        info!(
            mutations = result.num_mutations(),
            "Humanization complete."
        );
        Ok(result)
    }

    fn humanize_chain(
        &self,
        sequence: &str,
        role: ChainRole,
        reporter: &ProgressReporter,
    ) -> Result<GraftPlan, PipelineError> {
        let fail = |stage, e: HumanizationError| PipelineError::new(Some(role), stage, e);
        let scheme = self.params.scheme;

        let chain = self
            .numberer
            .number(sequence, scheme)
            .map_err(|e| fail(Stage::Numbering, e.into()))?;
        if !role.accepts(chain.chain_type()) {
            return Err(fail(
                Stage::Numbering,
                NumberingError::ChainTypeMismatch {
                    expected: role.as_str(),
                    found: chain.chain_type(),
                }
                .into(),
            ));
        }

        let map = CdrDefinitionMap::lookup(scheme, self.params.cdr_definition, chain.chain_type())
            .map_err(|e| fail(Stage::CdrLocation, e.into()))?;
        let location = locate::locate_with(&chain, &map);

        let choices = self.choices(role);
        let v = selection::select(&chain, choices.v.explicit_id(), self.germlines, &map)
            .map_err(|e| fail(Stage::GermlineSelection, e))?;
        let j = selection::select_j(&chain, choices.j.explicit_id(), self.germlines, &map)
            .map_err(|e| fail(Stage::GermlineSelection, e))?;
        info!(
            chain = %role,
            v_germline = v.id(),
            j_germline = j.map(|r| r.id()).unwrap_or("none"),
            "Selected germline template."
        );
        reporter.report(Progress::Message(format!(
            "{role} chain template: {}{}",
            v.id(),
            j.map(|r| format!(" + {}", r.id())).unwrap_or_default()
        )));

        let template = GermlineTemplate::new(v, j, scheme)
            .map_err(|e| fail(Stage::Grafting, e.into()))?;
        let plan = graft::graft(&chain, template, &location.cdr_positions, &map)
            .map_err(|e| fail(Stage::Grafting, e))?;

        let plan = vernier::backmutate(
            plan,
            &chain,
            &location.vernier_positions,
            self.params.backmutate_vernier,
        );

        let iterations = self.params.refinement_iterations;
        if iterations == 0 {
            return Ok(plan);
        }
        let oracle = self
            .oracle
            .ok_or_else(|| fail(Stage::Refinement, HumanizationError::MissingOracle { iterations }))?;
        let refined = refine::refine(&plan.sequence(), iterations, oracle)
            .map_err(|e| fail(Stage::Refinement, e))?;
        plan.apply_refined(&refined, iterations)
            .map_err(|e| fail(Stage::Refinement, e))
    }

    fn choices(&self, role: ChainRole) -> &ChainGermlines {
        match role {
            ChainRole::Heavy => &self.params.heavy_germlines,
            ChainRole::Light => &self.params.light_germlines,
        }
    }
}

fn validate_choices(
    germlines: &GermlineSet,
    role: ChainRole,
    choices: &ChainGermlines,
) -> Result<(), HumanizationError> {
    for (choice, segment) in [(&choices.v, GeneSegment::V), (&choices.j, GeneSegment::J)] {
        let GermlineChoice::Explicit(id) = choice else {
            continue;
        };
        let known = germlines
            .get(id)
            .is_some_and(|r| r.segment() == segment && role.accepts(r.chain_type()));
        if !known {
            return Err(HumanizationError::UnknownGermline {
                id: id.clone(),
                role,
                segment,
            });
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::models::chain::ChainType;
    use crate::core::models::scheme::{CdrDefinition, Scheme};
    use crate::core::numbering::engine::AnchorNumberer;
    use crate::engine::config::HumanizationParamsBuilder;
    use crate::engine::error::ErrorCategory;
    use crate::engine::refine::OracleError;
    use std::sync::Mutex;

    const HEAVY: &str = "QVQLVESGGGLVQPGGSLRLSCAASGFTFSSYAMSWVRQAPGKGLEWVSAISGSGGSTYYADSVKGRFTISRDNSKNTLYLQMNSLRAEDTAVYYCAKDRLSITIRPRYYGMDVWGQGTTVTVSS";
    const KAPPA: &str = "DIQMTQSPSSLSASVGDRVTITCRASQSISSYLNWYQQKPGKAPKLLIYAASSLQSGVPSRFSGSGSGTDFTLTISSLQPEDFATYYCQQSYSTPLTFGQGTKVEIK";

    fn builder(scheme: Scheme, definition: CdrDefinition) -> HumanizationParamsBuilder {
        HumanizationParamsBuilder::new()
            .scheme(scheme)
            .cdr_definition(definition)
    }

    #[test]
    fn unsupported_pair_is_a_configuration_error() {
        let set = GermlineSet::builtin(&AnchorNumberer).unwrap();
        let params = builder(Scheme::Aho, CdrDefinition::Kabat).build().unwrap();
        let err = Humanizer::new(&set, &AnchorNumberer, params, None).err().unwrap();
        assert_eq!(err.stage, Stage::Configuration);
        assert_eq!(err.role, None);
        assert!(err.category().aborts_run());
    }

    #[test]
    fn iterations_without_oracle_are_rejected() {
        let set = GermlineSet::builtin(&AnchorNumberer).unwrap();
        let params = builder(Scheme::Kabat, CdrDefinition::Kabat)
            .refinement_iterations(2)
            .build()
            .unwrap();
        let err = Humanizer::new(&set, &AnchorNumberer, params, None).err().unwrap();
        assert_eq!(err.source, HumanizationError::MissingOracle { iterations: 2 });
    }

    #[test]
    fn explicit_germlines_are_checked_against_the_chain_class() {
        let set = GermlineSet::builtin(&AnchorNumberer).unwrap();
        let params = builder(Scheme::Kabat, CdrDefinition::Kabat)
            .light_v_germline(GermlineChoice::Explicit("IGHV3-23*01".to_string()))
            .build()
            .unwrap();
        let err = Humanizer::new(&set, &AnchorNumberer, params, None).err().unwrap();
        assert_eq!(err.role, Some(ChainRole::Light));
        assert_eq!(err.category(), ErrorCategory::Configuration);

        let params = builder(Scheme::Kabat, CdrDefinition::Kabat)
            .light_v_germline(GermlineChoice::Explicit("IGLV2-14*01".to_string()))
            .heavy_j_germline(GermlineChoice::Explicit("IGHJ4*02".to_string()))
            .build()
            .unwrap();
        assert!(Humanizer::new(&set, &AnchorNumberer, params, None).is_ok());
    }

    #[test]
    fn swapped_chains_fail_numbering_with_the_role() {
        let set = GermlineSet::builtin(&AnchorNumberer).unwrap();
        let params = builder(Scheme::Kabat, CdrDefinition::Kabat).build().unwrap();
        let humanizer = Humanizer::new(&set, &AnchorNumberer, params, None).unwrap();
        let err = humanizer
            .humanize(Some(KAPPA), None, &ProgressReporter::new())
            .unwrap_err();
        assert_eq!(err.role, Some(ChainRole::Heavy));
        assert_eq!(err.stage, Stage::Numbering);
        assert_eq!(
            err.source,
            HumanizationError::Numbering(NumberingError::ChainTypeMismatch {
                expected: "heavy",
                found: ChainType::Kappa,
            })
        );
    }

    #[test]
    fn empty_input_fails_at_assembly() {
        let set = GermlineSet::builtin(&AnchorNumberer).unwrap();
        let humanizer =
            Humanizer::new(&set, &AnchorNumberer, HumanizationParams::default(), None).unwrap();
        let err = humanizer
            .humanize(None, None, &ProgressReporter::new())
            .unwrap_err();
        assert_eq!(err.stage, Stage::Assembly);
        assert_eq!(err.source, HumanizationError::EmptyInput);
    }

    #[test]
    fn detect_role_reads_the_chain_class() {
        let set = GermlineSet::builtin(&AnchorNumberer).unwrap();
        let humanizer =
            Humanizer::new(&set, &AnchorNumberer, HumanizationParams::default(), None).unwrap();
        assert_eq!(humanizer.detect_role(HEAVY).unwrap(), ChainRole::Heavy);
        assert_eq!(humanizer.detect_role(KAPPA).unwrap(), ChainRole::Light);
        assert_eq!(humanizer.detect_role("QVQL").unwrap_err().stage, Stage::Numbering);
    }

    #[test]
    fn paired_run_reports_phases_and_refines() {
        let set = GermlineSet::builtin(&AnchorNumberer).unwrap();
        let params = builder(Scheme::Kabat, CdrDefinition::Kabat)
            .refinement_iterations(1)
            .build()
            .unwrap();
        // Replaces the first residue, keeping the length.
        let oracle = |seq: &str| -> Result<String, OracleError> { Ok(format!("Q{}", &seq[1..])) };
        let humanizer = Humanizer::new(&set, &AnchorNumberer, params, Some(&oracle as &dyn RefinementOracle)).unwrap();

        let phases = Mutex::new(Vec::new());
        let reporter = ProgressReporter::with_callback(Box::new(|event| {
            if let Progress::PhaseStart { name } = event {
                phases.lock().unwrap().push(name);
            }
        }));
        let result = humanizer.humanize(Some(HEAVY), Some(KAPPA), &reporter).unwrap();
        drop(reporter);

        assert_eq!(
            phases.into_inner().unwrap(),
            vec!["Heavy chain", "Light chain", "Assembly"]
        );
        let heavy = result.heavy.as_ref().unwrap();
        let light = result.light.as_ref().unwrap();
        assert!(heavy.sequence.starts_with('Q'));
        assert!(light.sequence.starts_with('Q'));
        assert_eq!(light.chain_type, ChainType::Kappa);
        assert_eq!(result.provenance.refinement_iterations, 1);
    }
}

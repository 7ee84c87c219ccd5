use super::error::HumanizationError;
use super::graft::{GraftPlan, PlanEntry};
use crate::core::models::chain::ChainType;
use crate::core::models::position::Position;
use crate::core::models::scheme::{CdrDefinition, Scheme};
use std::fmt;

/// Settings that produced a result, used to name exported sequences.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Provenance {
    pub scheme: Scheme,
    pub cdr_definition: CdrDefinition,
    pub vernier_backmutation: bool,
    pub refinement_iterations: usize,
}

impl Provenance {
    /// `CDR_Grafted_<definition>_[Vernier_][Sapiens_<n>iter_]`
    pub fn export_name(&self) -> String {
        let mut name = format!("CDR_Grafted_{}_", self.cdr_definition);
        if self.vernier_backmutation {
            name.push_str("Vernier_");
        }
        if self.refinement_iterations > 0 {
            name.push_str(&format!("Sapiens_{}iter_", self.refinement_iterations));
        }
        name
    }
}

/// A difference between the final chain and its pure germline template.
/// `None` on either side is a gap.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Mutation {
    pub position: Position,
    pub germline: Option<char>,
    pub result: Option<char>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChainResult {
    pub chain_type: ChainType,
    pub sequence: String,
    pub v_germline: String,
    pub j_germline: Option<String>,
    pub mutations: Vec<Mutation>,
    pub warnings: Vec<String>,
    pub positions: Vec<PlanEntry>,
}

impl ChainResult {
    fn from_plan(plan: &GraftPlan) -> Self {
        let mutations = plan
            .entries()
            .iter()
            .filter(|e| e.residue != e.germline)
            .map(|e| Mutation {
                position: e.position,
                germline: e.germline,
                result: e.residue,
            })
            .collect();
        Self {
            chain_type: plan.chain_type(),
            sequence: plan.sequence(),
            v_germline: plan.template().v_id().to_string(),
            j_germline: plan.template().j_id().map(str::to_string),
            mutations,
            warnings: plan.warnings(),
            positions: plan.entries().to_vec(),
        }
    }

    pub fn num_mutations(&self) -> usize {
        self.mutations.len()
    }

    pub fn parental_sequence(&self) -> String {
        self.positions.iter().filter_map(|e| e.original).collect()
    }

    /// FASTA header text: `<name> VH (Humanized <name> <export><V gene>)`.
    pub fn fasta_description(&self, name: &str, provenance: &Provenance) -> String {
        format!(
            "{name} {} (Humanized {name} {}{})",
            self.chain_type.domain_name(),
            provenance.export_name(),
            self.v_germline
        )
    }

    fn write_alignment(&self, out: &mut impl fmt::Write, name: &str) -> fmt::Result {
        let row = |pick: fn(&PlanEntry) -> Option<char>| -> String {
            self.positions
                .iter()
                .map(|e| pick(e).unwrap_or('-'))
                .collect()
        };
        let parental = row(|e| e.original);
        let humanized = row(|e| e.residue);
        let germline = row(|e| e.germline);
        let matches: String = self
            .positions
            .iter()
            .map(|e| if e.original == e.residue { '|' } else { ' ' })
            .collect();

        writeln!(out, "{name} {}", self.chain_type.domain_name())?;
        writeln!(out, "{parental}")?;
        writeln!(out, "{matches}")?;
        writeln!(out, "{humanized}")?;
        write!(out, "{germline} {}", self.v_germline)?;
        if let Some(j) = &self.j_germline {
            write!(out, " + {j}")?;
        }
        writeln!(out)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HumanizationResult {
    pub heavy: Option<ChainResult>,
    pub light: Option<ChainResult>,
    pub provenance: Provenance,
}

impl HumanizationResult {
    pub fn chains(&self) -> impl Iterator<Item = &ChainResult> + '_ {
        self.heavy.iter().chain(self.light.iter())
    }

    pub fn num_mutations(&self) -> usize {
        self.chains().map(ChainResult::num_mutations).sum()
    }

    /// Parental, match, humanized and germline rows per chain.
    pub fn alignment<'r>(&'r self, name: &'r str) -> Alignment<'r> {
        Alignment { result: self, name }
    }

    pub fn alignment_string(&self, name: &str) -> String {
        self.alignment(name).to_string()
    }
}

/// Display adapter returned by [`HumanizationResult::alignment`].
pub struct Alignment<'r> {
    result: &'r HumanizationResult,
    name: &'r str,
}

impl fmt::Display for Alignment<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, chain) in self.result.chains().enumerate() {
            if i > 0 {
                writeln!(f)?;
            }
            chain.write_alignment(f, self.name)?;
        }
        Ok(())
    }
}

pub fn assemble(
    heavy: Option<&GraftPlan>,
    light: Option<&GraftPlan>,
    provenance: Provenance,
) -> Result<HumanizationResult, HumanizationError> {
    if heavy.is_none() && light.is_none() {
        return Err(HumanizationError::EmptyInput);
    }
    Ok(HumanizationResult {
        heavy: heavy.map(ChainResult::from_plan),
        light: light.map(ChainResult::from_plan),
        provenance,
    })
}

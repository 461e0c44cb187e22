use log::info;
use serde::Serialize;

use crate::error::{GrammarError, TableConflict};

use super::{
    first_follow::{FirstSets, FollowSets},
    grammar::Symbol,
    ll1_parsing_table::LL1ParsingTable,
    lr0_fsm::LR0FSM,
    slr1_parsing_table::SLR1ParsingTable,
    Grammar,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Classification {
    Both,
    LL1,
    SLR1,
    Neither,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParserKind {
    LL1,
    SLR1,
}

/// Everything derived from one grammar, computed once.
#[derive(Debug, Clone)]
pub struct Analysis {
    pub first: FirstSets,
    pub follow: FollowSets,
    pub ll1: Result<LL1ParsingTable, TableConflict>,
    pub lr0_fsm: LR0FSM,
    pub slr1: Result<SLR1ParsingTable, TableConflict>,
}

impl Analysis {
    pub fn is_ll1(&self) -> bool {
        self.ll1.is_ok()
    }

    pub fn is_slr1(&self) -> bool {
        self.slr1.is_ok()
    }

    pub fn classification(&self) -> Classification {
        match (self.is_ll1(), self.is_slr1()) {
            (true, true) => Classification::Both,
            (true, false) => Classification::LL1,
            (false, true) => Classification::SLR1,
            (false, false) => Classification::Neither,
        }
    }

    pub fn supports(&self, kind: ParserKind) -> bool {
        match kind {
            ParserKind::LL1 => self.is_ll1(),
            ParserKind::SLR1 => self.is_slr1(),
        }
    }

    /// `None` when the grammar has no table for `kind`.
    pub fn parse(&self, kind: ParserKind, input: &[Symbol]) -> Option<bool> {
        match kind {
            ParserKind::LL1 => self.ll1.as_ref().ok().map(|t| t.parse(input)),
            ParserKind::SLR1 => self.slr1.as_ref().ok().map(|t| t.parse(input)),
        }
    }
}

impl Grammar {
    pub fn analyze(&self) -> Result<Analysis, GrammarError> {
        self.validate()?;

        let first = self.compute_first();
        let follow = self.compute_follow(&first);
        let ll1 = self.generate_ll1_parsing_table(&first, &follow);
        let lr0_fsm = self.to_lr0_fsm()?;
        let slr1 = lr0_fsm.to_slr1_parsing_table(&follow);

        let analysis = Analysis {
            first,
            follow,
            ll1,
            lr0_fsm,
            slr1,
        };
        info!("grammar classified as {:?}", analysis.classification());
        Ok(analysis)
    }
}

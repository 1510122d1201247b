use bts_core::BtsNr;

use super::gsm_data::Bts;

/// All BTS objects of this process, in insertion order
#[derive(Debug, Default)]
pub struct BtsRegistry {
    bts: Vec<Bts>,
}

impl BtsRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a BTS. Returns it back if one with the same number exists.
    pub fn add(&mut self, bts: Bts) -> Result<(), Bts> {
        if self.contains(bts.nr) {
            return Err(bts);
        }
        self.bts.push(bts);
        Ok(())
    }

    pub fn remove(&mut self, bts_nr: BtsNr) -> Option<Bts> {
        let idx = self.bts.iter().position(|b| b.nr == bts_nr)?;
        Some(self.bts.remove(idx))
    }

    pub fn contains(&self, bts_nr: BtsNr) -> bool {
        self.bts.iter().any(|b| b.nr == bts_nr)
    }

    pub fn get(&self, bts_nr: BtsNr) -> Option<&Bts> {
        self.bts.iter().find(|b| b.nr == bts_nr)
    }

    pub fn get_mut(&mut self, bts_nr: BtsNr) -> Option<&mut Bts> {
        self.bts.iter_mut().find(|b| b.nr == bts_nr)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Bts> {
        self.bts.iter()
    }

    pub fn len(&self) -> usize {
        self.bts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bts.is_empty()
    }
}

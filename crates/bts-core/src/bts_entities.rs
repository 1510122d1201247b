/// Entities that exchange messages inside the BTS process
#[derive(PartialEq, Eq, Hash, Clone, Debug, Copy)]
pub enum BtsEntity {
    /// Message queues towards the DSP
    L1If,
    /// Primitive dispatcher on top of the DSP queues
    L1Sap,
    /// Abis/IP client towards the BSC
    Abis,
    /// OML message handler
    Oml,
    /// RSL message handler
    Rsl,
    /// BTS control core (lifecycle, CCCH scheduling)
    Bts,
}

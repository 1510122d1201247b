/// Service access points between the entities of the BTS process
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum Sap {
    /// Raw DSP primitives between the L1 transport and the L1 SAP
    L1Sap,
    /// L1 transport management (open, close)
    L1cSap,

    /// Operation and maintenance link (TEI 255, SAPI 0)
    OmlSap,
    /// Radio signalling link of a single TRX
    RslSap,
    /// Network management state changes, towards the OML handler
    NmSap,

    /// Inter-entity control messages
    Control,
}

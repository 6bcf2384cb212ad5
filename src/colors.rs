pub(crate) const BLURPLE: u32 = 0x5865F2;
pub(crate) const GREEN: u32 = 0x57F287;

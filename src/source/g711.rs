//! ITU-T G.711 expansion to 16-bit linear PCM.

const SIGN_BIT: u8 = 0x80;
const QUANT_MASK: u8 = 0x0f;
const SEG_MASK: u8 = 0x70;
const SEG_SHIFT: u8 = 4;
const MULAW_BIAS: i16 = 0x84;

pub fn alaw_to_linear(a: u8) -> i16 {
    let a = a ^ 0x55;
    let mut t = i16::from(a & QUANT_MASK) << 4;
    let seg = (a & SEG_MASK) >> SEG_SHIFT;
    match seg {
        0 => t += 8,
        1 => t += 0x108,
        _ => {
            t += 0x108;
            t <<= seg - 1;
        }
    }
    if a & SIGN_BIT != 0 { t } else { -t }
}

pub fn mulaw_to_linear(u: u8) -> i16 {
    let u = !u;
    let mut t = (i16::from(u & QUANT_MASK) << 3) + MULAW_BIAS;
    t <<= (u & SEG_MASK) >> SEG_SHIFT;
    if u & SIGN_BIT != 0 {
        MULAW_BIAS - t
    } else {
        t - MULAW_BIAS
    }
}

#[cfg(test)]
#[path = "../../tests/unit/source/g711.rs"]
mod tests;

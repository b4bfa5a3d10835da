// SIMD kernels for similarity scoring
// Components are stored as f32 but every product is accumulated in f64,
// so scores stay stable after rounding regardless of the dispatch path.

#[cfg(target_arch = "x86_64")]
use std::arch::x86_64::*;

#[cfg(target_arch = "aarch64")]
use std::arch::aarch64::*;

// Below this length the scalar loop wins over SIMD setup
#[cfg(any(target_arch = "x86_64", target_arch = "aarch64"))]
const MIN_DIM_SIZE_SIMD: usize = 16;

/// Dot product of two equal-length slices, accumulated in f64
///
/// Callers check lengths; extra components of the longer slice are ignored.
#[inline]
pub fn dot_product_simd(a: &[f32], b: &[f32]) -> f64 {
    debug_assert_eq!(a.len(), b.len());
    let len = a.len().min(b.len());
    let (a, b) = (&a[..len], &b[..len]);

    #[cfg(target_arch = "x86_64")]
    {
        if is_x86_feature_detected!("avx2")
            && is_x86_feature_detected!("fma")
            && len >= MIN_DIM_SIZE_SIMD
        {
            return unsafe { dot_product_avx2(a, b) };
        }
    }

    #[cfg(target_arch = "aarch64")]
    {
        if std::arch::is_aarch64_feature_detected!("neon") && len >= MIN_DIM_SIZE_SIMD {
            return unsafe { dot_product_neon(a, b) };
        }
    }

    dot_product_scalar(a, b)
}

/// AVX2 dot product, 8 floats per iteration widened into two f64 lanes
#[cfg(target_arch = "x86_64")]
#[target_feature(enable = "avx2", enable = "fma")]
#[inline]
unsafe fn dot_product_avx2(a: &[f32], b: &[f32]) -> f64 {
    let dim = a.len();
    let mut i = 0;

    let mut sum1 = _mm256_setzero_pd();
    let mut sum2 = _mm256_setzero_pd();

    while i + 7 < dim {
        let vx1 = _mm256_cvtps_pd(_mm_loadu_ps(a.as_ptr().add(i)));
        let vy1 = _mm256_cvtps_pd(_mm_loadu_ps(b.as_ptr().add(i)));
        let vx2 = _mm256_cvtps_pd(_mm_loadu_ps(a.as_ptr().add(i + 4)));
        let vy2 = _mm256_cvtps_pd(_mm_loadu_ps(b.as_ptr().add(i + 4)));

        sum1 = _mm256_fmadd_pd(vx1, vy1, sum1);
        sum2 = _mm256_fmadd_pd(vx2, vy2, sum2);

        i += 8;
    }

    let combined = _mm256_add_pd(sum1, sum2);
    let high = _mm256_extractf128_pd(combined, 1);
    let low = _mm256_castpd256_pd128(combined);
    let pair = _mm_add_pd(high, low);
    let total = _mm_add_sd(pair, _mm_unpackhi_pd(pair, pair));

    let mut dot = _mm_cvtsd_f64(total);
    while i < dim {
        dot += f64::from(a[i]) * f64::from(b[i]);
        i += 1;
    }

    dot
}

/// NEON dot product for ARM64 / Apple Silicon
#[cfg(target_arch = "aarch64")]
#[target_feature(enable = "neon")]
#[inline]
unsafe fn dot_product_neon(a: &[f32], b: &[f32]) -> f64 {
    let dim = a.len();
    let mut i = 0;

    let mut sum1 = vdupq_n_f64(0.0);
    let mut sum2 = vdupq_n_f64(0.0);

    while i + 3 < dim {
        let va = vld1q_f32(a.as_ptr().add(i));
        let vb = vld1q_f32(b.as_ptr().add(i));

        sum1 = vfmaq_f64(sum1, vcvt_f64_f32(vget_low_f32(va)), vcvt_f64_f32(vget_low_f32(vb)));
        sum2 = vfmaq_f64(sum2, vcvt_high_f64_f32(va), vcvt_high_f64_f32(vb));

        i += 4;
    }

    let mut dot = vaddvq_f64(vaddq_f64(sum1, sum2));
    while i < dim {
        dot += f64::from(a[i]) * f64::from(b[i]);
        i += 1;
    }

    dot
}

/// Scalar dot product (two accumulators for better pipelining)
#[inline]
fn dot_product_scalar(a: &[f32], b: &[f32]) -> f64 {
    let mut sum0 = 0.0f64;
    let mut sum1 = 0.0f64;

    let chunks = a.chunks_exact(2);
    let remainder = chunks.remainder();

    for (a_chunk, b_chunk) in chunks.zip(b.chunks_exact(2)) {
        sum0 += f64::from(a_chunk[0]) * f64::from(b_chunk[0]);
        sum1 += f64::from(a_chunk[1]) * f64::from(b_chunk[1]);
    }

    if let (Some(x), Some(y)) = (remainder.first(), b.last()) {
        sum0 += f64::from(*x) * f64::from(*y);
    }

    sum0 + sum1
}

/// Squared Euclidean norm
#[inline]
pub fn norm_squared_simd(v: &[f32]) -> f64 {
    dot_product_simd(v, v)
}

/// Euclidean norm
#[inline]
pub fn norm_simd(v: &[f32]) -> f64 {
    norm_squared_simd(v).sqrt()
}

//! Retrieval model selection and parameters.
//!
//! A [`RetrievalModel`] decides both how leaf postings are scored and how documents missing
//! from part of a query are treated. It is a closed set of variants; parameters are checked
//! once at construction and never change afterwards.

use std::{fmt, str::FromStr};

use crate::ConfigError;

/// BM25 parameters.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Bm25Params {
    /// Term-frequency saturation.
    pub k1: f64,
    /// Document-length normalization strength.
    pub b: f64,
    /// Query-term-frequency saturation.
    pub k3: f64,
}

impl Bm25Params {
    /// Creates BM25 parameters, rejecting values outside `k1 >= 0`, `0 <= b <= 1`, `k3 >= 0`.
    pub fn new(k1: f64, b: f64, k3: f64) -> Result<Self, ConfigError> {
        non_negative("model.k1", k1)?;
        unit_interval("model.b", b)?;
        non_negative("model.k3", k3)?;
        Ok(Self { k1, b, k3 })
    }

    /// Weight applied to every query term by `#SUM`.
    ///
    /// Query terms are never repeated, so the query term frequency is fixed at one.
    pub fn query_term_weight(&self) -> f64 {
        let qtf = 1.0;
        (self.k3 + 1.0) * qtf / (self.k3 + qtf)
    }
}

/// Indri (Dirichlet-smoothed language model) parameters.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct IndriParams {
    /// Dirichlet prior.
    pub mu: f64,
    /// Mixing weight between the smoothed document model and the collection model.
    pub lambda: f64,
}

impl IndriParams {
    /// Creates Indri parameters, rejecting values outside `mu >= 0`, `0 <= lambda <= 1`.
    pub fn new(mu: f64, lambda: f64) -> Result<Self, ConfigError> {
        non_negative("model.mu", mu)?;
        unit_interval("model.lambda", lambda)?;
        Ok(Self { mu, lambda })
    }

    /// Smoothed probability of a term occurring `tf` times in a document of length `doclen`,
    /// given its collection probability `p_collection`.
    ///
    /// An empty document with `mu == 0` has no document model; only the collection part counts.
    pub fn smoothed(&self, tf: f64, doclen: f64, p_collection: f64) -> f64 {
        let denominator = doclen + self.mu;
        let document = if denominator > 0.0 {
            (tf + self.mu * p_collection) / denominator
        } else {
            0.0
        };
        self.lambda * document + (1.0 - self.lambda) * p_collection
    }
}

/// The retrieval model used to score a query.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum RetrievalModel {
    /// Exact-match boolean retrieval; every match scores 1.0.
    UnrankedBoolean,
    /// Exact-match boolean retrieval scored by term frequency.
    RankedBoolean,
    /// Okapi BM25.
    Bm25(Bm25Params),
    /// Indri query-likelihood with Dirichlet smoothing.
    Indri(IndriParams),
}

/// The three scoring families an operator can be defined for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ModelFamily {
    /// Either boolean model.
    Boolean,
    /// BM25.
    Bm25,
    /// Indri.
    Indri,
}

impl RetrievalModel {
    /// Creates a BM25 model.
    pub fn bm25(k1: f64, b: f64, k3: f64) -> Result<Self, ConfigError> {
        Ok(Self::Bm25(Bm25Params::new(k1, b, k3)?))
    }

    /// Creates an Indri model.
    pub fn indri(mu: f64, lambda: f64) -> Result<Self, ConfigError> {
        Ok(Self::Indri(IndriParams::new(mu, lambda)?))
    }

    /// Returns the scoring family of this model.
    pub fn family(&self) -> ModelFamily {
        match self {
            Self::UnrankedBoolean | Self::RankedBoolean => ModelFamily::Boolean,
            Self::Bm25(_) => ModelFamily::Bm25,
            Self::Indri(_) => ModelFamily::Indri,
        }
    }

    /// BM25 parameters, if this is the BM25 model.
    pub fn bm25_params(&self) -> Option<&Bm25Params> {
        match self {
            Self::Bm25(params) => Some(params),
            _ => None,
        }
    }

    /// Indri parameters, if this is the Indri model.
    pub fn indri_params(&self) -> Option<&IndriParams> {
        match self {
            Self::Indri(params) => Some(params),
            _ => None,
        }
    }

    /// Canonical name of the model.
    pub fn name(&self) -> &'static str {
        self.algorithm().name()
    }

    /// Returns the parameterless algorithm tag of this model.
    pub fn algorithm(&self) -> Algorithm {
        match self {
            Self::UnrankedBoolean => Algorithm::UnrankedBoolean,
            Self::RankedBoolean => Algorithm::RankedBoolean,
            Self::Bm25(_) => Algorithm::Bm25,
            Self::Indri(_) => Algorithm::Indri,
        }
    }
}

impl fmt::Display for RetrievalModel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::UnrankedBoolean | Self::RankedBoolean => write!(f, "{}", self.name()),
            Self::Bm25(p) => write!(f, "BM25 (k1={}, b={}, k3={})", p.k1, p.b, p.k3),
            Self::Indri(p) => write!(f, "Indri (mu={}, lambda={})", p.mu, p.lambda),
        }
    }
}

/// Retrieval algorithm named in a configuration file, before parameters are attached.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Algorithm {
    /// See [`RetrievalModel::UnrankedBoolean`].
    UnrankedBoolean,
    /// See [`RetrievalModel::RankedBoolean`].
    RankedBoolean,
    /// See [`RetrievalModel::Bm25`].
    Bm25,
    /// See [`RetrievalModel::Indri`].
    Indri,
}

impl Algorithm {
    /// Canonical name of the algorithm.
    pub fn name(self) -> &'static str {
        match self {
            Self::UnrankedBoolean => "UnrankedBoolean",
            Self::RankedBoolean => "RankedBoolean",
            Self::Bm25 => "BM25",
            Self::Indri => "Indri",
        }
    }
}

impl FromStr for Algorithm {
    type Err = ConfigError;

    /// Parses an algorithm name, ignoring case, `-` and `_`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized: String = s
            .chars()
            .filter(|c| *c != '-' && *c != '_')
            .collect::<String>()
            .to_ascii_lowercase();
        match normalized.as_str() {
            "unrankedboolean" => Ok(Self::UnrankedBoolean),
            "rankedboolean" => Ok(Self::RankedBoolean),
            "bm25" => Ok(Self::Bm25),
            "indri" => Ok(Self::Indri),
            _ => Err(ConfigError::UnknownAlgorithm(s.to_string())),
        }
    }
}

/// Checks `value >= 0`.
fn non_negative(key: &str, value: f64) -> Result<(), ConfigError> {
    if value >= 0.0 {
        Ok(())
    } else {
        Err(ConfigError::invalid(key, value, "must be >= 0"))
    }
}

/// Checks `0 <= value <= 1`.
fn unit_interval(key: &str, value: f64) -> Result<(), ConfigError> {
    if (0.0..=1.0).contains(&value) {
        Ok(())
    } else {
        Err(ConfigError::invalid(key, value, "must be between 0 and 1"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bm25_rejects_out_of_range() {
        assert!(RetrievalModel::bm25(1.2, 0.75, 0.0).is_ok());
        assert!(RetrievalModel::bm25(-0.1, 0.75, 0.0).is_err());
        assert!(RetrievalModel::bm25(1.2, 1.5, 0.0).is_err());
        assert!(RetrievalModel::bm25(1.2, 0.75, -1.0).is_err());
    }

    #[test]
    fn indri_rejects_out_of_range() {
        assert!(RetrievalModel::indri(2500.0, 0.4).is_ok());
        assert!(RetrievalModel::indri(-1.0, 0.4).is_err());
        let err = RetrievalModel::indri(2500.0, 1.1).unwrap_err();
        assert!(err.to_string().contains("model.lambda"));
    }

    #[test]
    fn nan_is_rejected() {
        assert!(RetrievalModel::bm25(f64::NAN, 0.5, 0.0).is_err());
        assert!(RetrievalModel::indri(100.0, f64::NAN).is_err());
    }

    #[test]
    fn query_term_weight_is_one_when_k3_is_zero() {
        let params = Bm25Params::new(1.2, 0.75, 0.0).unwrap();
        assert!((params.query_term_weight() - 1.0).abs() < 1e-12);

        let params = Bm25Params::new(1.2, 0.75, 7.0).unwrap();
        assert!((params.query_term_weight() - 1.0).abs() < 1e-12);
    }

    #[test]
    fn families() {
        assert_eq!(RetrievalModel::UnrankedBoolean.family(), ModelFamily::Boolean);
        assert_eq!(RetrievalModel::RankedBoolean.family(), ModelFamily::Boolean);
        assert_eq!(RetrievalModel::bm25(1.0, 0.5, 0.0).unwrap().family(), ModelFamily::Bm25);
        assert_eq!(RetrievalModel::indri(10.0, 0.5).unwrap().family(), ModelFamily::Indri);
    }

    #[test]
    fn parameter_accessors() {
        let bm25 = RetrievalModel::bm25(1.2, 0.75, 3.0).unwrap();
        assert_eq!(bm25.bm25_params().map(|p| p.k3), Some(3.0));
        assert!(bm25.indri_params().is_none());

        let indri = RetrievalModel::indri(2500.0, 0.4).unwrap();
        assert_eq!(indri.indri_params().map(|p| p.mu), Some(2500.0));
        assert!(indri.bm25_params().is_none());
        assert!(RetrievalModel::RankedBoolean.bm25_params().is_none());
    }

    #[test]
    fn algorithm_names_are_lenient() {
        assert_eq!("BM25".parse::<Algorithm>().unwrap(), Algorithm::Bm25);
        assert_eq!("indri".parse::<Algorithm>().unwrap(), Algorithm::Indri);
        assert_eq!(
            "UnrankedBoolean".parse::<Algorithm>().unwrap(),
            Algorithm::UnrankedBoolean
        );
        assert_eq!(
            "ranked-boolean".parse::<Algorithm>().unwrap(),
            Algorithm::RankedBoolean
        );
        assert_eq!(
            "ranked_Boolean".parse::<Algorithm>().unwrap(),
            Algorithm::RankedBoolean
        );
        assert!("tfidf".parse::<Algorithm>().is_err());
    }

    #[test]
    fn indri_smoothing_matches_formula() {
        let p = IndriParams::new(100.0, 0.5).unwrap();
        let expected = 0.5 * (3.0 + 100.0 * 0.01) / (50.0 + 100.0) + 0.5 * 0.01;
        assert!((p.smoothed(3.0, 50.0, 0.01) - expected).abs() < 1e-15);
    }
}

//! Built-in formula sheets served while text providers are rate limited.

const MECHANICS: &str = r#"# Classical Mechanics Formulas

## Newton's Laws
**Second Law:**
> **F = ma**
> - F = force (N)
> - m = mass (kg)
> - a = acceleration (m/s²)

**Third Law:** every action has an equal and opposite reaction.

## Kinematics (constant acceleration)
> **v = u + at**
> **s = ut + ½at²**
> **v² = u² + 2as**

## Work and Energy
> **W = F·d·cos(θ)**
> **KE = ½mv²**
> **PE = mgh** (g = 9.81 m/s²)

## Momentum
> **p = mv**
> **m₁u₁ + m₂u₂ = m₁v₁ + m₂v₂**
"#;

const THERMODYNAMICS: &str = r#"# Thermodynamics Formulas

## First Law
> **ΔU = Q - W**
> - ΔU = change in internal energy
> - Q = heat added to the system
> - W = work done by the system

## Ideal Gas Law
> **PV = nRT** (R = 8.314 J/mol·K)

## Heat Transfer
> **Q = kAΔT/d** (conduction)
> **Q = mcΔT** (heat capacity)
"#;

const CALCULUS: &str = r#"# Calculus Formulas

## Derivatives
> **d/dx(xⁿ) = nxⁿ⁻¹**
> **d/dx(uv) = u'v + uv'**
> **d/dx(f(g(x))) = f'(g(x))·g'(x)**

## Integrals
> **∫xⁿdx = xⁿ⁺¹/(n+1) + C**
> **∫u dv = uv - ∫v du**

## Fundamental Theorem
> **∫ₐᵇ f'(x)dx = f(b) - f(a)**
"#;

const ALGEBRA: &str = r#"# Algebra Formulas

## Quadratic Formula
> **x = (-b ± √(b² - 4ac)) / 2a**

## Factoring
> **a² - b² = (a + b)(a - b)**
> **a² + 2ab + b² = (a + b)²**

## Logarithms
> **log(ab) = log(a) + log(b)**
> **log(a/b) = log(a) - log(b)**
> **log(aⁿ) = n·log(a)**
"#;

const STOICHIOMETRY: &str = r#"# Stoichiometry Formulas

## Moles
> **n = m/M**
> **N = n × Nₐ** (Nₐ = 6.022 × 10²³ mol⁻¹)

## Gas Laws
> **PV = nRT**
> **P₁V₁/T₁ = P₂V₂/T₂**

## Concentration
> **M = n/V** (mol/L)
"#;

/// Look up a built-in sheet by subject and topic, ignoring case.
pub(crate) fn sheet(subject: &str, topic: &str) -> Option<&'static str> {
    let subject = subject.trim().to_lowercase();
    let topic = topic.trim().to_lowercase();
    match (subject.as_str(), topic.as_str()) {
        ("physics", "mechanics") => Some(MECHANICS),
        ("physics", "thermodynamics") => Some(THERMODYNAMICS),
        ("mathematics", "calculus") => Some(CALCULUS),
        ("mathematics", "algebra") => Some(ALGEBRA),
        ("chemistry", "stoichiometry") => Some(STOICHIOMETRY),
        _ => None,
    }
}

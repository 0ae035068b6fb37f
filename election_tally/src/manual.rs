/*!

This is the long-form manual for `election_tally` and `rcvplus`.

## Input formats

`rcvplus` reads a single JSON file. The shape of the top-level value decides the
kind of election:
* an array: ranked ballots, for `irv`, `btr-irv` and `stv`,
* an object: votes per party, for `sainte-lague`.

### Ranked ballots

```text
[
  {"count": 3, "ranking": ["Anna", "Bob"]},
  {"count": 2.5, "ranking": ["Bob", "Anna", "Carl"]},
  {"ranking": []}
]
```

`count` is optional (1 by default) and must be strictly positive. It may be
fractional. `ranking` is mandatory and lists the candidates from the most preferred
to the least preferred. A candidate may appear at most once in a ranking. An empty
ranking is accepted: its weight is exhausted from the first round.

The candidates of the election are all the names that appear in at least one
ranking.

### Party votes

```text
{"Greens": 1200, "Reds": 870, "Blues": 0}
```

Every value must be a non-negative number.

## Methods

### `irv`

Instant-runoff voting. At each round, every ballot counts for its first continuing
candidate. A candidate with strictly more than half of the non-exhausted weight
wins. Otherwise the candidates with the lowest tally are eliminated and their
ballots move to their next continuing choice. A ballot without any continuing
choice is exhausted.

### `btr-irv` (also `btr`, `b2`)

Bottoms-up two-round IRV. The majority check is the same as `irv`, but at each
round only the two lowest candidates are considered, and the one that fewer
ballots prefer in a head-to-head comparison is eliminated. Only ballots ranking
both candidates take part in the comparison. If it is tied, the candidate with
the lower tally is eliminated. If the tallies are equal too, the tie-break mode
decides: `eliminateAll` removes both, or reports that there is no unique winner
when nobody else is left.

This is the default method for single-seat elections.

### `stv`

Single transferable vote for several seats, with a Droop quota recomputed at every
round:

```text
quota = floor((total - exhausted) / (seats + 1)) + 1
```

Candidates at or above the quota are elected, from the highest tally to the
lowest. The surplus of each elected candidate is transferred with the Gregory
method: each ballot moves on with its weight multiplied by `surplus / tally`. If
nobody reaches the quota, the lowest candidate is eliminated and its ballots move
on with their full weight. When only as many candidates continue as there are
seats left, they are all elected.

This is the default method when more than one seat is requested.

### `sainte-lague` (also `webster`, `pr`)

Seats are awarded one by one to the party with the highest quotient
`votes / (2 * seats + 1)`. Equal quotients are resolved in favor of the party
whose name sorts first.

## Ties

The tie-break mode controls which candidates get eliminated when several of them
share the lowest tally:
* `eliminateAll` (default): all of them are eliminated at once. If this would
  leave no candidate (or not enough candidates to fill the remaining seats), the
  count stops with a `NoUniqueWinner` error listing the tied candidates.
* `useCandidateOrder`: only the candidate whose name sorts last is eliminated.
* `random`: the tied candidates are ordered by the SHA-256 digest of the seed,
  the round number and their name, and the first one is eliminated. The same seed
  always produces the same count.

## Configuration

`rcvplus` comes with sensible defaults, which can be changed with a JSON
configuration file passed with `--config`:

```text
{
  "contestName": "Board election",
  "tiebreakMode": "random",
  "randomSeed": "42",
  "maxSeats": 500
}
```

All the fields are optional.
- `contestName` (string): copied into the JSON summary.
- `tiebreakMode` (string): one of the modes listed in [Ties](#ties).
- `randomSeed` (string holding a number): mandatory when `tiebreakMode` is
  `random`, ignored otherwise.
- `maxSeats` (number): the largest number of seats that `sainte-lague` accepts.
  Defaults to 10000.

## Output

A table with the tally of each round is always printed. With `--out`, a JSON
summary of all the rounds is also written, either to a file or to `stdout`. With
`--reference`, the summary is compared to a previously saved one and the
differences are printed; any difference makes the command fail.

 */
